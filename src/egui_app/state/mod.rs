use std::future::Future;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;

use thiserror::Error;
use tokio::runtime::Runtime;
use uuid::Uuid;

use crate::client::{
    ApiGateway, GatewayError, Navigation, Navigator, Route, SessionContext, SessionState,
    TokenProvider,
};
use crate::egui_app::config::Config;
use crate::egui_app::forms::{EventForm, LoginForm, RegisterForm};
use crate::shared::{Event, User};

/// Result of background work, applied on the next frame
#[derive(Debug)]
pub enum AppMessage {
    AuthFinished(Result<User, String>),
    LoggedOut,
    EventsLoaded(Result<Vec<Event>, String>),
    EventLoaded(Result<Event, String>),
    /// A create/update/delete/register/unregister call returned
    MutationFinished {
        result: Result<(), String>,
        then: Option<Route>,
    },
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to start async runtime: {0}")]
    Runtime(#[from] std::io::Error),

    #[error("failed to create API client: {0}")]
    Gateway(#[from] GatewayError),
}

/// Central application state shared across egui views.
pub struct AppState {
    runtime: Runtime,
    pub config: Config,
    pub session: Arc<SessionContext>,
    pub gateway: ApiGateway,
    pub navigator: Navigator,
    session_state: SessionState,

    pub login_form: LoginForm,
    pub register_form: RegisterForm,
    pub event_form: EventForm,

    pub events: Vec<Event>,
    pub loading_events: bool,
    /// An auth call or mutation is in flight
    pub busy: bool,
    pub error: Option<String>,
    /// Event awaiting delete confirmation
    pub confirm_delete: Option<Uuid>,

    prepared_route: Option<Route>,
    logging_out: bool,
    tx: Sender<AppMessage>,
    rx: Receiver<AppMessage>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, StartupError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()?;

        let navigator = Navigator::new(Route::Dashboard);
        let gateway = config.build_gateway(navigator.unauthorized_handler())?;
        let provider = Arc::new(TokenProvider::new(gateway.clone()));
        let session = Arc::new(SessionContext::new(provider));

        let (tx, rx) = channel();
        let state = Self {
            runtime,
            config,
            session,
            gateway,
            navigator,
            session_state: SessionState::Uninitialized,
            login_form: LoginForm::default(),
            register_form: RegisterForm::default(),
            event_form: EventForm::new_event(),
            events: Vec::new(),
            loading_events: false,
            busy: false,
            error: None,
            confirm_delete: None,
            prepared_route: None,
            logging_out: false,
            tx,
            rx,
        };

        let session = state.session.clone();
        state.runtime.spawn(async move {
            session.init().await;
        });
        tracing::info!("Connecting to {}", state.config.server_url());

        Ok(state)
    }

    fn spawn<F>(&self, task: F)
    where
        F: Future<Output = AppMessage> + Send + 'static,
    {
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let message = task.await;
            if tx.send(message).is_err() {
                tracing::debug!("UI closed before a background result arrived");
            }
        });
    }

    pub fn session_state(&self) -> &SessionState {
        &self.session_state
    }

    pub fn current_user(&self) -> Option<&User> {
        self.session_state.user()
    }

    /// Apply finished background work and follow session changes
    pub fn poll(&mut self) {
        while let Ok(message) = self.rx.try_recv() {
            self.apply(message);
        }

        let state = self.session.state();
        if state != self.session_state {
            let previous = std::mem::replace(&mut self.session_state, state);
            self.on_session_change(previous);
        }
    }

    fn on_session_change(&mut self, previous: SessionState) {
        if self.session_state.is_authenticated() {
            return;
        }
        if previous.is_authenticated() && !self.logging_out {
            self.error = Some(GatewayError::session_expired().user_message());
        }
        self.events.clear();
        self.confirm_delete = None;
        self.prepared_route = None;
    }

    fn apply(&mut self, message: AppMessage) {
        match message {
            AppMessage::AuthFinished(result) => {
                self.busy = false;
                match result {
                    Ok(user) => {
                        tracing::info!("Signed in as {}", user.email);
                        self.login_form.clear_secrets();
                        self.register_form = RegisterForm::default();
                        self.error = None;
                        self.navigator.navigate(Route::Dashboard);
                    }
                    Err(e) => self.error = Some(e),
                }
            }
            AppMessage::LoggedOut => {
                self.logging_out = false;
                self.login_form = LoginForm::default();
                self.events.clear();
                self.navigator.navigate(Route::Login);
            }
            AppMessage::EventsLoaded(result) => {
                self.loading_events = false;
                if !self.session_state.is_authenticated() {
                    return;
                }
                match result {
                    Ok(events) => self.events = events,
                    Err(e) => self.error = Some(e),
                }
            }
            AppMessage::EventLoaded(result) => match result {
                Ok(event) => {
                    if self.navigator.current() == Route::EditEvent(event.id) {
                        self.event_form = EventForm::from_event(&event);
                    }
                }
                Err(e) => {
                    self.error = Some(e);
                    self.navigator.navigate(Route::Dashboard);
                }
            },
            AppMessage::MutationFinished { result, then } => {
                self.busy = false;
                match result {
                    Ok(()) => {
                        self.error = None;
                        if let Some(route) = then {
                            self.navigator.navigate(route);
                            self.prepared_route = Some(route);
                        }
                    }
                    Err(e) => self.error = Some(e),
                }
                self.refresh_events();
            }
        }
    }

    /// Guarded navigation for this frame
    pub fn navigation(&mut self) -> Navigation {
        let navigation = self.navigator.resolve(&self.session_state);
        if let Navigation::Render(route) | Navigation::Redirect(route) = navigation {
            self.prepare_route(route);
        }
        navigation
    }

    fn prepare_route(&mut self, route: Route) {
        if self.prepared_route == Some(route) {
            return;
        }
        self.prepared_route = Some(route);

        match route {
            Route::NewEvent => self.event_form = EventForm::new_event(),
            Route::EditEvent(id) => match self.events.iter().find(|event| event.id == id) {
                Some(event) => self.event_form = EventForm::from_event(event),
                None => self.load_event(id),
            },
            Route::Dashboard => self.refresh_events(),
            Route::Login | Route::Register => {}
        }
    }

    /// User-initiated navigation
    pub fn go_to(&mut self, route: Route) {
        self.error = None;
        self.confirm_delete = None;
        self.navigator.navigate(route);
    }

    // ---- auth ----------------------------------------------------------

    pub fn handle_login(&mut self) {
        let request = match self.login_form.to_request() {
            Ok(request) => request,
            Err(e) => {
                self.error = Some(e.to_string());
                return;
            }
        };

        self.busy = true;
        self.error = None;

        let session = self.session.clone();
        self.spawn(async move {
            let result = session
                .login(&request.email, &request.password)
                .await
                .map_err(|e| e.user_message());
            AppMessage::AuthFinished(result)
        });
    }

    pub fn handle_register(&mut self) {
        let request = match self.register_form.to_request() {
            Ok(request) => request,
            Err(e) => {
                self.error = Some(e.to_string());
                return;
            }
        };

        self.busy = true;
        self.error = None;

        let session = self.session.clone();
        self.spawn(async move {
            let result = session
                .register(&request)
                .await
                .map_err(|e| e.user_message());
            AppMessage::AuthFinished(result)
        });
    }

    pub fn logout(&mut self) {
        self.logging_out = true;
        self.error = None;

        let session = self.session.clone();
        self.spawn(async move {
            session.logout().await;
            AppMessage::LoggedOut
        });
    }

    // ---- events --------------------------------------------------------

    pub fn refresh_events(&mut self) {
        if !self.session.state().is_authenticated() {
            return;
        }
        self.loading_events = true;
        let gateway = self.gateway.clone();
        self.spawn(async move {
            AppMessage::EventsLoaded(gateway.list_events().await.map_err(|e| e.user_message()))
        });
    }

    fn load_event(&mut self, id: Uuid) {
        let gateway = self.gateway.clone();
        self.spawn(async move {
            AppMessage::EventLoaded(gateway.get_event(id).await.map_err(|e| e.user_message()))
        });
    }

    /// Run a mutation; the list is refetched whatever the outcome
    fn mutate<F>(&mut self, then: Option<Route>, task: F)
    where
        F: Future<Output = Result<(), GatewayError>> + Send + 'static,
    {
        self.busy = true;
        self.error = None;
        self.spawn(async move {
            let result = task.await.map_err(|e| e.user_message());
            AppMessage::MutationFinished { result, then }
        });
    }

    pub fn open_new_event(&mut self) {
        self.go_to(Route::NewEvent);
    }

    pub fn open_edit_event(&mut self, event: &Event) {
        self.event_form = EventForm::from_event(event);
        self.prepared_route = Some(Route::EditEvent(event.id));
        self.go_to(Route::EditEvent(event.id));
    }

    pub fn submit_event_form(&mut self) {
        let gateway = self.gateway.clone();
        match self.event_form.editing {
            Some(id) => match self.event_form.to_update() {
                Ok(update) => self.mutate(Some(Route::Dashboard), async move {
                    gateway.update_event(id, &update).await.map(|_| ())
                }),
                Err(e) => self.error = Some(e.to_string()),
            },
            None => match self.event_form.to_draft() {
                Ok(draft) => self.mutate(Some(Route::Dashboard), async move {
                    gateway.create_event(&draft).await.map(|_| ())
                }),
                Err(e) => self.error = Some(e.to_string()),
            },
        }
    }

    pub fn delete_event(&mut self, id: Uuid) {
        self.confirm_delete = None;
        let gateway = self.gateway.clone();
        self.mutate(None, async move { gateway.delete_event(id).await });
    }

    pub fn register_for_event(&mut self, id: Uuid) {
        let gateway = self.gateway.clone();
        self.mutate(None, async move {
            gateway.register_for_event(id).await.map(|_| ())
        });
    }

    pub fn unregister_from_event(&mut self, id: Uuid) {
        let gateway = self.gateway.clone();
        self.mutate(None, async move {
            gateway.unregister_from_event(id).await.map(|_| ())
        });
    }

    /// Called on exit; the session context returns to uninitialized
    pub fn shutdown(&mut self) {
        self.session.teardown();
    }
}
