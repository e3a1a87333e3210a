//! Thermostat session: state mirrors plus the configuration contract.
//!
//! The session owns three mirrors (`tstat`, `blower`, `heatpump`). They change
//! only when a channel frame for their source arrives or when the session
//! fetches them explicitly; both replace the mirror wholesale. Mutations PUT a
//! single-field document and leave the mirrors alone: the backend merges the
//! field and pushes a corrected snapshot over the channel later.
//!
//! Setpoint increments are computed from the cached mirror. Two increments
//! issued before the corrective snapshot arrives start from the same base, so
//! the second overwrites the first rather than adding to it.

use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::{Value, json};
use tokio::sync::broadcast;
use tracing::{debug, instrument, warn};
use tstat_core::constants::DEFAULT_ZONE;
use tstat_core::{
    BlowerState, FanMode, HeatPumpState, InboundMessage, MirrorError, Mode, ReconnectConfig,
    Source, ThermostatState, VacationConfig,
};

use crate::channel::StateChannel;
use crate::errors::{RequestError, SessionError};
use crate::events::{SessionEvent, UpdateOrigin};
use crate::http::{HttpClient, HttpResponse};

/// Capacity of the event fan-out. Slow subscribers miss the oldest events.
const EVENT_CAPACITY: usize = 256;

/// The backend serves the vacation table, which is thermostat-wide, under zone 1 only.
const VACATION_ZONE: u8 = 1;

/// Session construction parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionConfig {
    /// Origin of the configuration API, e.g. `http://localhost:8080`.
    pub base_url: String,
    /// Zone addressed by configuration requests.
    pub zone: u8,
    /// Live channel reconnect policy.
    pub reconnect: ReconnectConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            zone: DEFAULT_ZONE,
            reconnect: ReconnectConfig::default(),
        }
    }
}

/// Result of routing one inbound message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dispatch {
    /// The mirror for this source was replaced.
    Applied(Source),
    /// Unknown source; nothing changed.
    Ignored,
    /// Malformed message; nothing changed.
    Rejected,
}

#[derive(Debug, Default)]
struct Mirrors {
    tstat: ThermostatState,
    blower: BlowerState,
    heat_pump: HeatPumpState,
}

/// State reachable from both the session handle and the channel handler.
struct Shared {
    mirrors: RwLock<Mirrors>,
    events: broadcast::Sender<SessionEvent>,
    last_error: RwLock<Option<RequestError>>,
}

impl Shared {
    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    fn replace(
        &self,
        source: Source,
        data: Value,
        origin: UpdateOrigin,
    ) -> Result<(), MirrorError> {
        {
            let mut mirrors = self.mirrors.write();
            match source {
                Source::Tstat => mirrors.tstat = ThermostatState::from_value(data)?,
                Source::Blower => mirrors.blower = BlowerState::from_value(data)?,
                Source::HeatPump => mirrors.heat_pump = HeatPumpState::from_value(data)?,
            }
        }
        debug!(%source, ?origin, "mirror replaced");
        self.emit(SessionEvent::StateChanged { source, origin });
        Ok(())
    }

    fn dispatch(&self, message: InboundMessage) -> Dispatch {
        let Some(source) = message.source_kind() else {
            debug!(source = %message.source, "ignoring message from unknown source");
            return Dispatch::Ignored;
        };
        match self.replace(source, message.data, UpdateOrigin::Channel) {
            Ok(()) => Dispatch::Applied(source),
            Err(e) => {
                warn!(%source, error = %e, "rejecting message");
                self.emit(SessionEvent::MessageRejected {
                    reason: format!("{source}: {e}"),
                });
                Dispatch::Rejected
            }
        }
    }

    fn dispatch_frame(&self, frame: Value) -> Dispatch {
        match InboundMessage::from_value(frame) {
            Ok(message) => self.dispatch(message),
            Err(e) => {
                warn!(error = %e, "rejecting frame without source/data");
                self.emit(SessionEvent::MessageRejected {
                    reason: e.to_string(),
                });
                Dispatch::Rejected
            }
        }
    }

    fn track<T>(
        &self,
        operation: &'static str,
        result: Result<T, RequestError>,
    ) -> Result<T, RequestError> {
        match result {
            Ok(value) => {
                *self.last_error.write() = None;
                Ok(value)
            }
            Err(error) => {
                warn!(operation, error = %error, "request failed");
                *self.last_error.write() = Some(error.clone());
                self.emit(SessionEvent::RequestFailed {
                    operation,
                    error: error.clone(),
                });
                Err(error)
            }
        }
    }
}

/// Bridges the live channel and the configuration API to a view layer.
pub struct ThermostatSession {
    http: Arc<dyn HttpClient>,
    base_url: String,
    zone: u8,
    shared: Arc<Shared>,
    channel: StateChannel,
}

impl ThermostatSession {
    /// Create a session with empty mirrors. Nothing is connected until
    /// [`initialize`](Self::initialize).
    pub fn new(http: Arc<dyn HttpClient>, config: SessionConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            zone: config.zone,
            shared: Arc::new(Shared {
                mirrors: RwLock::new(Mirrors::default()),
                events,
                last_error: RwLock::new(None),
            }),
            channel: StateChannel::new(config.reconnect),
        }
    }

    /// Open the live channel at `ws_url` and route its frames into the mirrors.
    pub fn initialize(&self, ws_url: &str) -> Result<(), SessionError> {
        let shared = Arc::clone(&self.shared);
        self.channel.start(ws_url, move |frame| {
            let _ = shared.dispatch_frame(frame);
        })?;
        Ok(())
    }

    /// Route one inbound message into the mirror named by its source.
    ///
    /// The live channel calls this for every frame. Known sources replace
    /// their mirror with `data` exactly; unknown sources are ignored.
    pub fn dispatch(&self, message: InboundMessage) -> Dispatch {
        self.shared.dispatch(message)
    }

    /// The live channel, for status and error subscriptions.
    pub fn channel(&self) -> &StateChannel {
        &self.channel
    }

    /// Zone addressed by configuration requests.
    pub fn zone(&self) -> u8 {
        self.zone
    }

    /// Snapshot of the thermostat mirror.
    pub fn tstat(&self) -> ThermostatState {
        self.shared.mirrors.read().tstat.clone()
    }

    /// Snapshot of the blower mirror.
    pub fn blower(&self) -> BlowerState {
        self.shared.mirrors.read().blower.clone()
    }

    /// Snapshot of the heat pump mirror.
    pub fn heat_pump(&self) -> HeatPumpState {
        self.shared.mirrors.read().heat_pump.clone()
    }

    /// Subscribe to state change and failure notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.shared.events.subscribe()
    }

    /// The last request failure, cleared by the next successful request.
    pub fn last_error(&self) -> Option<RequestError> {
        self.shared.last_error.read().clone()
    }

    /// Stop the live channel. Mirrors keep their last values.
    pub fn close(&self) {
        self.channel.close();
    }

    // ─── Fetches ─────────────────────────────────────────────────────────

    /// Fetch the zone configuration and replace the thermostat mirror with it.
    #[instrument(skip(self), fields(zone = self.zone))]
    pub async fn refresh_state(&self) -> Result<ThermostatState, SessionError> {
        let url = self.config_url();
        self.refresh("refresh_state", &url, Source::Tstat).await?;
        Ok(self.tstat())
    }

    /// Fetch air handler readings and replace the blower mirror with them.
    #[instrument(skip(self))]
    pub async fn refresh_blower(&self) -> Result<BlowerState, SessionError> {
        let url = format!("{}/api/airhandler", self.base_url);
        self.refresh("refresh_blower", &url, Source::Blower).await?;
        Ok(self.blower())
    }

    /// Fetch heat pump readings and replace the heat pump mirror with them.
    #[instrument(skip(self))]
    pub async fn refresh_heat_pump(&self) -> Result<HeatPumpState, SessionError> {
        let url = format!("{}/api/heatpump", self.base_url);
        self.refresh("refresh_heat_pump", &url, Source::HeatPump).await?;
        Ok(self.heat_pump())
    }

    /// Fetch the thermostat's global settings table. Not mirrored.
    #[instrument(skip(self))]
    pub async fn thermostat_settings(&self) -> Result<Value, SessionError> {
        let url = format!("{}/api/tstat/settings", self.base_url);
        let result = self.get_json(&url).await;
        Ok(self.shared.track("thermostat_settings", result)?)
    }

    /// Fetch the vacation parameters.
    #[instrument(skip(self))]
    pub async fn vacation(&self) -> Result<VacationConfig, SessionError> {
        let url = self.vacation_url();
        let result = self.get_json(&url).await.and_then(|body| {
            serde_json::from_value::<VacationConfig>(body).map_err(|e| RequestError::Decode {
                message: e.to_string(),
            })
        });
        Ok(self.shared.track("vacation", result)?)
    }

    // ─── Mutations ───────────────────────────────────────────────────────

    /// PUT `{"fanMode": speed}`.
    #[instrument(skip(self), fields(zone = self.zone))]
    pub async fn set_fan_speed(&self, speed: FanMode) -> Result<(), SessionError> {
        self.put_config("set_fan_speed", json!({ "fanMode": speed })).await
    }

    /// PUT `{"mode": mode}`.
    #[instrument(skip(self), fields(zone = self.zone))]
    pub async fn set_mode(&self, mode: Mode) -> Result<(), SessionError> {
        self.put_config("set_mode", json!({ "mode": mode })).await
    }

    /// PUT `{"hold": hold}`.
    #[instrument(skip(self), fields(zone = self.zone))]
    pub async fn set_hold(&self, hold: bool) -> Result<(), SessionError> {
        self.put_config("set_hold", json!({ "hold": hold })).await
    }

    /// PUT `{"coolSetpoint": cached + delta}` and return the value sent.
    #[instrument(skip(self), fields(zone = self.zone))]
    pub async fn inc_cool_setpoint(&self, delta: i64) -> Result<Value, SessionError> {
        self.inc_setpoint("inc_cool_setpoint", "coolSetpoint", delta).await
    }

    /// PUT `{"heatSetpoint": cached + delta}` and return the value sent.
    #[instrument(skip(self), fields(zone = self.zone))]
    pub async fn inc_heat_setpoint(&self, delta: i64) -> Result<Value, SessionError> {
        self.inc_setpoint("inc_heat_setpoint", "heatSetpoint", delta).await
    }

    /// PUT the set fields of `config`. An empty config sends nothing.
    #[instrument(skip(self))]
    pub async fn set_vacation(&self, config: &VacationConfig) -> Result<(), SessionError> {
        if config.is_empty() {
            debug!("no vacation fields set, skipping request");
            return Ok(());
        }
        let body = serde_json::to_value(config).map_err(|e| RequestError::Decode {
            message: e.to_string(),
        })?;
        let url = self.vacation_url();
        self.put("set_vacation", &url, &body).await
    }

    // ─── Helpers ─────────────────────────────────────────────────────────

    fn config_url(&self) -> String {
        format!("{}/api/zone/{}/config", self.base_url, self.zone)
    }

    fn vacation_url(&self) -> String {
        format!("{}/api/zone/{VACATION_ZONE}/vacation", self.base_url)
    }

    /// GET `url` and replace the mirror for `source` with the body. A body
    /// that is not a JSON object counts as a failed request.
    async fn refresh(
        &self,
        operation: &'static str,
        url: &str,
        source: Source,
    ) -> Result<(), RequestError> {
        let result = self.get_json(url).await.and_then(|body| {
            self.shared
                .replace(source, body, UpdateOrigin::Fetch)
                .map_err(|e| RequestError::Decode {
                    message: e.to_string(),
                })
        });
        self.shared.track(operation, result)
    }

    async fn inc_setpoint(
        &self,
        operation: &'static str,
        field: &'static str,
        delta: i64,
    ) -> Result<Value, SessionError> {
        // Read and release the lock before awaiting
        let target = self.shared.mirrors.read().tstat.offset_setpoint(field, delta);
        let Some(target) = target else {
            return Err(SessionError::MissingField { field });
        };
        let mut body = serde_json::Map::new();
        let _ = body.insert(field.to_string(), target.clone());
        self.put_config(operation, Value::Object(body)).await?;
        Ok(target)
    }

    async fn put_config(&self, operation: &'static str, body: Value) -> Result<(), SessionError> {
        let url = self.config_url();
        self.put(operation, &url, &body).await
    }

    async fn get_json(&self, url: &str) -> Result<Value, RequestError> {
        self.http.get(url).await?.error_for_status()?.json()
    }

    async fn put(
        &self,
        operation: &'static str,
        url: &str,
        body: &Value,
    ) -> Result<(), SessionError> {
        let result = self.put_checked(url, body).await;
        let response = self.shared.track(operation, result)?;
        // The corrected state arrives over the channel, not in this body
        debug!(operation, status = response.status, body = %response.body, "update accepted");
        Ok(())
    }

    async fn put_checked(&self, url: &str, body: &Value) -> Result<HttpResponse, RequestError> {
        self.http.put_json(url, body).await?.error_for_status()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    /// Records every request and answers from a canned response.
    #[derive(Default)]
    struct RecordingHttp {
        requests: Mutex<Vec<(String, String, Option<Value>)>>,
        response: Mutex<Option<Result<HttpResponse, RequestError>>>,
    }

    impl RecordingHttp {
        fn answering(status: u16, body: &str) -> Arc<Self> {
            let http = Self::default();
            *http.response.lock() = Some(Ok(HttpResponse {
                status,
                body: body.to_string(),
            }));
            Arc::new(http)
        }

        fn failing(error: RequestError) -> Arc<Self> {
            let http = Self::default();
            *http.response.lock() = Some(Err(error));
            Arc::new(http)
        }

        fn requests(&self) -> Vec<(String, String, Option<Value>)> {
            self.requests.lock().clone()
        }

        fn answer(&self) -> Result<HttpResponse, RequestError> {
            self.response.lock().clone().unwrap_or(Ok(HttpResponse {
                status: 200,
                body: String::new(),
            }))
        }
    }

    #[async_trait]
    impl HttpClient for RecordingHttp {
        async fn get(&self, url: &str) -> Result<HttpResponse, RequestError> {
            self.requests.lock().push(("GET".into(), url.into(), None));
            self.answer()
        }

        async fn put_json(&self, url: &str, body: &Value) -> Result<HttpResponse, RequestError> {
            self.requests
                .lock()
                .push(("PUT".into(), url.into(), Some(body.clone())));
            self.answer()
        }
    }

    fn session(http: Arc<RecordingHttp>) -> ThermostatSession {
        ThermostatSession::new(http, SessionConfig::default())
    }

    fn message(source: &str, data: Value) -> InboundMessage {
        InboundMessage {
            source: source.into(),
            data,
        }
    }

    // ── dispatch ────────────────────────────────────────────────────

    #[test]
    fn mirrors_start_empty() {
        let s = session(RecordingHttp::answering(200, ""));
        assert!(s.tstat().is_empty());
        assert!(s.blower().is_empty());
        assert!(s.heat_pump().is_empty());
        assert!(s.last_error().is_none());
    }

    #[test]
    fn tstat_message_replaces_mirror_exactly() {
        let s = session(RecordingHttp::answering(200, ""));
        let _ = s.dispatch(message(
            "tstat",
            json!({"coolSetpoint": 70, "mode": "cool", "hold": false}),
        ));
        let data = json!({"heatSetpoint": 64});
        assert_eq!(s.dispatch(message("tstat", data.clone())), Dispatch::Applied(Source::Tstat));
        // No deep merge: earlier fields are gone
        assert_eq!(s.tstat().to_value(), data);
        assert!(s.tstat().cool_setpoint().is_none());
    }

    #[test]
    fn blower_and_heat_pump_route_to_their_mirrors() {
        let s = session(RecordingHttp::answering(200, ""));
        let _ = s.dispatch(message("blower", json!({"blowerRPM": 700})));
        let _ = s.dispatch(message("heatpump", json!({"coilTemp": 40.5})));
        assert_eq!(s.blower().blower_rpm(), Some(700));
        assert_eq!(s.heat_pump().coil_temp(), Some(40.5));
        assert!(s.tstat().is_empty());
    }

    #[test]
    fn unknown_source_changes_nothing() {
        let s = session(RecordingHttp::answering(200, ""));
        let _ = s.dispatch(message("tstat", json!({"coolSetpoint": 70})));
        let _ = s.dispatch(message("blower", json!({"blowerRPM": 700})));
        let before = (s.tstat(), s.blower(), s.heat_pump());

        let mut events = s.subscribe();
        assert_eq!(s.dispatch(message("damper", json!({"open": true}))), Dispatch::Ignored);
        assert_eq!((s.tstat(), s.blower(), s.heat_pump()), before);
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn non_object_data_is_rejected() {
        let s = session(RecordingHttp::answering(200, ""));
        let _ = s.dispatch(message("tstat", json!({"coolSetpoint": 70})));
        let mut events = s.subscribe();
        assert_eq!(s.dispatch(message("tstat", json!("oops"))), Dispatch::Rejected);
        assert_eq!(s.tstat().cool_setpoint(), Some(70.0));
        assert_matches!(events.try_recv(), Ok(SessionEvent::MessageRejected { .. }));
    }

    #[test]
    fn frame_without_envelope_is_rejected() {
        let s = session(RecordingHttp::answering(200, ""));
        assert_eq!(s.shared.dispatch_frame(json!({"data": {}})), Dispatch::Rejected);
        assert_eq!(s.shared.dispatch_frame(json!(42)), Dispatch::Rejected);
    }

    #[test]
    fn dispatch_notifies_subscribers() {
        let s = session(RecordingHttp::answering(200, ""));
        let mut events = s.subscribe();
        let _ = s.dispatch(message("blower", json!({})));
        assert_eq!(
            events.try_recv().unwrap(),
            SessionEvent::StateChanged {
                source: Source::Blower,
                origin: UpdateOrigin::Channel,
            }
        );
    }

    // ── mutations ───────────────────────────────────────────────────

    #[tokio::test]
    async fn set_fan_speed_puts_single_field_and_leaves_mirror() {
        let http = RecordingHttp::answering(200, "");
        let s = session(http.clone());
        let _ = s.dispatch(message("tstat", json!({"fanMode": "auto"})));

        s.set_fan_speed(FanMode::High).await.unwrap();

        assert_eq!(
            http.requests(),
            vec![(
                "PUT".to_string(),
                "http://localhost:8080/api/zone/1/config".to_string(),
                Some(json!({"fanMode": "high"}))
            )]
        );
        assert_eq!(s.tstat().fan_mode(), Some(FanMode::Auto));
    }

    #[tokio::test]
    async fn set_mode_and_hold_bodies() {
        let http = RecordingHttp::answering(200, "");
        let s = session(http.clone());
        s.set_mode(Mode::Off).await.unwrap();
        s.set_hold(true).await.unwrap();
        let bodies: Vec<Value> = http.requests().into_iter().filter_map(|r| r.2).collect();
        assert_eq!(bodies, vec![json!({"mode": "off"}), json!({"hold": true})]);
    }

    #[tokio::test]
    async fn inc_cool_setpoint_uses_cached_value() {
        let http = RecordingHttp::answering(200, "");
        let s = session(http.clone());
        let _ = s.dispatch(message("tstat", json!({"coolSetpoint": 70})));

        let sent = s.inc_cool_setpoint(2).await.unwrap();

        assert_eq!(sent, json!(72));
        assert_eq!(http.requests()[0].2, Some(json!({"coolSetpoint": 72})));
    }

    #[tokio::test]
    async fn back_to_back_increments_share_a_stale_base() {
        let http = RecordingHttp::answering(200, "");
        let s = session(http.clone());
        let _ = s.dispatch(message("tstat", json!({"heatSetpoint": 70})));

        let _ = s.inc_heat_setpoint(1).await.unwrap();
        let _ = s.inc_heat_setpoint(1).await.unwrap();

        let bodies: Vec<Value> = http.requests().into_iter().filter_map(|r| r.2).collect();
        assert_eq!(
            bodies,
            vec![json!({"heatSetpoint": 71}), json!({"heatSetpoint": 71})]
        );
    }

    #[tokio::test]
    async fn increment_without_cached_setpoint_sends_nothing() {
        let http = RecordingHttp::answering(200, "");
        let s = session(http.clone());
        let err = s.inc_cool_setpoint(1).await.unwrap_err();
        assert_matches!(err, SessionError::MissingField { field: "coolSetpoint" });
        assert!(http.requests().is_empty());
    }

    #[tokio::test]
    async fn zone_is_parameterized() {
        let http = RecordingHttp::answering(200, "");
        let s = ThermostatSession::new(
            http.clone(),
            SessionConfig {
                base_url: "http://hvac:8080/".into(),
                zone: 3,
                ..SessionConfig::default()
            },
        );
        s.set_hold(false).await.unwrap();
        assert_eq!(http.requests()[0].1, "http://hvac:8080/api/zone/3/config");
    }

    #[tokio::test]
    async fn empty_vacation_sends_nothing() {
        let http = RecordingHttp::answering(200, "");
        let s = session(http.clone());
        s.set_vacation(&VacationConfig::default()).await.unwrap();
        assert!(http.requests().is_empty());
    }

    // ── fetches and failures ────────────────────────────────────────

    #[tokio::test]
    async fn refresh_state_replaces_tstat() {
        let http = RecordingHttp::answering(200, r#"{"coolSetpoint": 75, "mode": "auto"}"#);
        let s = session(http.clone());
        let _ = s.dispatch(message("tstat", json!({"coolSetpoint": 70, "hold": true})));
        let mut events = s.subscribe();

        let tstat = s.refresh_state().await.unwrap();

        assert_eq!(tstat.to_value(), json!({"coolSetpoint": 75, "mode": "auto"}));
        assert_eq!(s.tstat(), tstat);
        assert_eq!(http.requests()[0].0, "GET");
        assert_eq!(
            events.try_recv().unwrap(),
            SessionEvent::StateChanged {
                source: Source::Tstat,
                origin: UpdateOrigin::Fetch,
            }
        );
    }

    #[tokio::test]
    async fn failed_refresh_surfaces_error_and_keeps_mirror() {
        let http = RecordingHttp::answering(500, "bus timeout");
        let s = session(http);
        let _ = s.dispatch(message("tstat", json!({"coolSetpoint": 70})));
        let mut events = s.subscribe();

        let err = s.refresh_state().await.unwrap_err();

        assert_matches!(err, SessionError::Request(RequestError::Status { status: 500, .. }));
        assert_eq!(s.tstat().cool_setpoint(), Some(70.0));
        assert_matches!(s.last_error(), Some(RequestError::Status { status: 500, .. }));
        assert_matches!(
            events.try_recv(),
            Ok(SessionEvent::RequestFailed { operation: "refresh_state", .. })
        );
    }

    #[tokio::test]
    async fn success_clears_last_error() {
        let http = RecordingHttp::failing(RequestError::Timeout { timeout_ms: 10 });
        let s = session(http.clone());
        assert!(s.set_mode(Mode::Heat).await.is_err());
        assert!(s.last_error().is_some());

        *http.response.lock() = None;
        s.set_mode(Mode::Heat).await.unwrap();
        assert!(s.last_error().is_none());
    }

    #[tokio::test]
    async fn refresh_with_non_object_body_is_a_failed_request() {
        let http = RecordingHttp::failing(RequestError::Timeout { timeout_ms: 10 });
        let s = session(http.clone());
        assert!(s.refresh_state().await.is_err());

        *http.response.lock() = Some(Ok(HttpResponse {
            status: 200,
            body: "[1,2]".to_string(),
        }));
        let mut events = s.subscribe();

        assert_matches!(
            s.refresh_state().await,
            Err(SessionError::Request(RequestError::Decode { .. }))
        );
        assert!(s.tstat().is_empty());
        assert_matches!(s.last_error(), Some(RequestError::Decode { .. }));
        assert_matches!(
            events.try_recv(),
            Ok(SessionEvent::RequestFailed { operation: "refresh_state", .. })
        );
    }

    #[tokio::test]
    async fn blower_refresh_with_non_object_body_is_a_failed_request() {
        let s = session(RecordingHttp::answering(200, "\"idle\""));
        assert_matches!(
            s.refresh_blower().await,
            Err(SessionError::Request(RequestError::Decode { .. }))
        );
        assert_matches!(s.last_error(), Some(RequestError::Decode { .. }));
    }

    #[tokio::test]
    async fn vacation_is_addressed_under_zone_one() {
        let http = RecordingHttp::answering(200, r#"{"active": false}"#);
        let s = ThermostatSession::new(
            http.clone(),
            SessionConfig {
                zone: 3,
                ..SessionConfig::default()
            },
        );
        let _ = s.vacation().await.unwrap();
        let update = VacationConfig {
            days: Some(2),
            ..VacationConfig::default()
        };
        s.set_vacation(&update).await.unwrap();

        let urls: Vec<String> = http.requests().into_iter().map(|r| r.1).collect();
        assert_eq!(
            urls,
            vec![
                "http://localhost:8080/api/zone/1/vacation".to_string(),
                "http://localhost:8080/api/zone/1/vacation".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn vacation_with_unrecognized_fan_mode_decodes() {
        let s = session(RecordingHttp::answering(
            200,
            r#"{"active": false, "days": 0, "minTemperature": 60, "maxTemperature": 85,
                "minHumidity": 15, "maxHumidity": 60, "fanMode": "unknown"}"#,
        ));
        let config = s.vacation().await.unwrap();
        assert_eq!(config.max_temperature, Some(85));
        assert!(config.fan_mode.is_none());
        assert!(s.last_error().is_none());
    }

    #[tokio::test]
    async fn vacation_decodes() {
        let s = session(RecordingHttp::answering(
            200,
            r#"{"active": true, "days": 3, "fanMode": "low"}"#,
        ));
        let config = s.vacation().await.unwrap();
        assert_eq!(config.active, Some(true));
        assert_eq!(config.days, Some(3));
        assert_eq!(config.fan_mode, Some(FanMode::Low));
    }
}
