//! Application state and the fetch pipeline that feeds it.
//!
//! Every user action becomes a [`Request`] run by [`FetchPipeline`] under a
//! fresh generation number. The pipeline reports back through [`Event`]s and
//! [`DashboardState::apply`] is the only place state changes. Starting a new
//! request cancels the previous one, and events carrying an older generation
//! are discarded, so a slow response can never overwrite a newer one.

use std::sync::Arc;

use tokio::{sync::mpsc, task::JoinHandle};
use tokio_util::sync::CancellationToken;

use crate::{
    Config,
    error::WeatherError,
    forecast,
    geocode::{self, Geocoder},
    location::{self, DeniedGeolocator, Geolocator},
    model::{Coordinates, CurrentWeather, Forecast, Locator},
    provider::{self, WeatherProvider},
    recent::RecentCities,
};

/// A user action that leads to a weather fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Search(Locator),
    MyLocation,
    MapClick(Coordinates),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Started { generation: u64 },
    PlaceResolved { generation: u64, name: String },
    CurrentLoaded { generation: u64, weather: CurrentWeather },
    ForecastLoaded { generation: u64, forecast: Forecast },
    ForecastFailed { generation: u64, error: WeatherError },
    Failed { generation: u64, error: WeatherError },
}

impl Event {
    pub fn generation(&self) -> u64 {
        match self {
            Event::Started { generation }
            | Event::PlaceResolved { generation, .. }
            | Event::CurrentLoaded { generation, .. }
            | Event::ForecastLoaded { generation, .. }
            | Event::ForecastFailed { generation, .. }
            | Event::Failed { generation, .. } => *generation,
        }
    }
}

/// How a pipeline run ended when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Completed,
    /// A newer request cancelled this one.
    Superseded,
}

#[derive(Debug, Default)]
pub struct DashboardState {
    pub current: Option<CurrentWeather>,
    pub forecast: Forecast,
    /// Place name of the last map pick, shown while its weather loads.
    pub picked_place: Option<String>,
    /// User-visible message from the last failed action.
    pub notice: Option<String>,
    pub loading: bool,
    pub recent: RecentCities,
    generation: u64,
}

impl DashboardState {
    pub fn new(recent: RecentCities) -> Self {
        Self { recent, ..Self::default() }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Apply one event. Returns false when the event is stale and was ignored.
    ///
    /// Failures leave the last good weather on screen and only set `notice`.
    /// Forecast failures are logged and leave the forecast views empty.
    pub fn apply(&mut self, event: Event) -> bool {
        if let Event::Started { generation } = event {
            if generation <= self.generation {
                return false;
            }
            self.generation = generation;
            self.loading = true;
            self.notice = None;
            self.picked_place = None;
            return true;
        }

        if event.generation() != self.generation {
            tracing::debug!(
                stale = event.generation(),
                latest = self.generation,
                "dropping stale event"
            );
            return false;
        }

        match event {
            Event::Started { .. } => {}
            Event::PlaceResolved { name, .. } => {
                self.picked_place = Some(name);
            }
            Event::CurrentLoaded { weather, .. } => {
                tracing::info!(city = %weather.name, "weather updated");
                self.recent.record(&weather.name);
                if let Err(e) = self.recent.save() {
                    tracing::warn!("Failed to persist recent cities: {e}");
                }
                self.current = Some(weather);
                self.forecast = Forecast::default();
                self.loading = false;
            }
            Event::ForecastLoaded { forecast, .. } => {
                self.forecast = forecast;
            }
            Event::ForecastFailed { error, .. } => {
                tracing::warn!("Error fetching forecast: {error}");
                self.forecast = Forecast::default();
            }
            Event::Failed { error, .. } => {
                tracing::warn!("Fetch failed: {error}");
                self.notice = Some(error.user_message());
                self.loading = false;
            }
        }

        true
    }
}

/// Handle identifying one pipeline run.
#[derive(Debug, Clone)]
pub struct FetchTicket {
    pub generation: u64,
    pub token: CancellationToken,
}

/// Runs a [`Request`] end to end: resolve location, current weather, forecast.
#[derive(Debug, Clone)]
pub struct FetchPipeline {
    provider: Arc<dyn WeatherProvider>,
    geocoder: Option<Arc<dyn Geocoder>>,
    geolocator: Arc<dyn Geolocator>,
}

impl FetchPipeline {
    pub fn new(provider: Arc<dyn WeatherProvider>) -> Self {
        Self { provider, geocoder: None, geolocator: Arc::new(DeniedGeolocator) }
    }

    pub fn with_geocoder(mut self, geocoder: Arc<dyn Geocoder>) -> Self {
        self.geocoder = Some(geocoder);
        self
    }

    pub fn with_geolocator(mut self, geolocator: Arc<dyn Geolocator>) -> Self {
        self.geolocator = geolocator;
        self
    }

    pub async fn run(
        &self,
        ticket: FetchTicket,
        request: Request,
        events: mpsc::UnboundedSender<Event>,
    ) -> Result<FetchOutcome, WeatherError> {
        let generation = ticket.generation;
        let emit = |event: Event| {
            // The receiver only goes away when the dashboard is dropped.
            let _ = events.send(event);
        };

        let steps = async {
            let locator = self.resolve(generation, request, &emit).await?;

            let weather = self.provider.fetch_current(&locator).await?;
            let coordinates = weather.coordinates;
            emit(Event::CurrentLoaded { generation, weather });

            match self.provider.fetch_forecast(coordinates).await {
                Ok(samples) => {
                    let forecast = forecast::aggregate(&samples);
                    emit(Event::ForecastLoaded { generation, forecast });
                }
                Err(error) => emit(Event::ForecastFailed { generation, error }),
            }

            Ok::<_, WeatherError>(())
        };

        tokio::select! {
            _ = ticket.token.cancelled() => {
                tracing::debug!(generation, "fetch superseded");
                Ok(FetchOutcome::Superseded)
            }
            result = steps => match result {
                Ok(()) => Ok(FetchOutcome::Completed),
                Err(error) => {
                    emit(Event::Failed { generation, error: error.clone() });
                    Err(error)
                }
            }
        }
    }

    async fn resolve(
        &self,
        generation: u64,
        request: Request,
        emit: &impl Fn(Event),
    ) -> Result<Locator, WeatherError> {
        match request {
            Request::Search(locator) => Ok(locator),
            Request::MyLocation => {
                let coordinates = self.geolocator.current_position().await?;
                Ok(Locator::Coordinates(coordinates))
            }
            Request::MapClick(coordinates) => {
                let geocoder = self.geocoder.as_deref().ok_or(WeatherError::MapUnavailable)?;
                let name = geocode::place_name_at(geocoder, coordinates).await?;
                emit(Event::PlaceResolved { generation, name });
                Ok(Locator::Coordinates(coordinates))
            }
        }
    }
}

/// Owns the state container and dispatches requests through the pipeline.
#[derive(Debug)]
pub struct Dashboard {
    pipeline: FetchPipeline,
    state: DashboardState,
    next_generation: u64,
    inflight: Option<CancellationToken>,
    events_tx: mpsc::UnboundedSender<Event>,
    events_rx: mpsc::UnboundedReceiver<Event>,
}

impl Dashboard {
    pub fn new(pipeline: FetchPipeline, recent: RecentCities) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            pipeline,
            state: DashboardState::new(recent),
            next_generation: 0,
            inflight: None,
            events_tx,
            events_rx,
        }
    }

    /// Wire up providers from config and load the persisted recent cities.
    pub fn from_config(config: &Config) -> Result<Self, WeatherError> {
        let provider: Arc<dyn WeatherProvider> = Arc::from(provider::provider_from_config(config)?);
        let geolocator: Arc<dyn Geolocator> = Arc::from(location::geolocator_from_config(config)?);

        let mut pipeline = FetchPipeline::new(provider).with_geolocator(geolocator);
        if let Some(geocoder) = geocode::geocoder_from_config(config)? {
            pipeline = pipeline.with_geocoder(Arc::from(geocoder));
        }

        let recent = RecentCities::load().unwrap_or_else(|e| {
            tracing::warn!("Recent cities unavailable: {e}");
            RecentCities::in_memory()
        });

        Ok(Self::new(pipeline, recent))
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    /// Cancel whatever is in flight and start a new generation.
    pub fn begin(&mut self) -> FetchTicket {
        if let Some(previous) = self.inflight.take() {
            previous.cancel();
        }

        self.next_generation += 1;
        let token = CancellationToken::new();
        self.inflight = Some(token.clone());
        self.state.apply(Event::Started { generation: self.next_generation });

        FetchTicket { generation: self.next_generation, token }
    }

    /// Start `request` in the background. Call [`Dashboard::sync`] to fold its
    /// events into the state.
    pub fn dispatch(&mut self, request: Request) -> JoinHandle<Result<FetchOutcome, WeatherError>> {
        let ticket = self.begin();
        let pipeline = self.pipeline.clone();
        let events = self.events_tx.clone();

        tokio::spawn(async move { pipeline.run(ticket, request, events).await })
    }

    /// Apply every event received so far.
    pub fn sync(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            self.state.apply(event);
        }
    }

    /// Run `request` to completion and apply its events.
    pub async fn perform(&mut self, request: Request) -> Result<FetchOutcome, WeatherError> {
        let handle = self.dispatch(request);
        let result = handle.await.unwrap_or_else(|e| {
            Err(WeatherError::NetworkFailure(format!("fetch task failed: {e}")))
        });
        self.sync();
        result
    }

    pub async fn search(&mut self, city: &str) -> Result<FetchOutcome, WeatherError> {
        self.perform(Request::Search(Locator::City(city.trim().to_string()))).await
    }

    pub async fn search_coordinates(
        &mut self,
        coordinates: Coordinates,
    ) -> Result<FetchOutcome, WeatherError> {
        self.perform(Request::Search(Locator::Coordinates(coordinates))).await
    }

    pub async fn use_my_location(&mut self) -> Result<FetchOutcome, WeatherError> {
        self.perform(Request::MyLocation).await
    }

    pub async fn map_click(&mut self, coordinates: Coordinates) -> Result<FetchOutcome, WeatherError> {
        self.perform(Request::MapClick(coordinates)).await
    }
}
