use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::api::providers::auth::SignUpOutcome;
use crate::api::{ApiError, AuthProvider, AuthSession, AuthUser, Services};
use crate::auth::SessionStore;
use crate::checkin::{
    finalize, import_file, lookup, CheckInSink, CommandCapture, JsonFileSink, LookupOutcome,
    LookupTicket, MediaCapture, MediaItem, VehicleData,
};
use crate::config::Config;
use crate::ui::auth_screen::{AuthAction, AuthMode, AuthScreen};
use crate::ui::checkin::{CheckInAction, CheckInScreen};
use crate::ui::dialogs::{ConfirmDialog, ConfirmPurpose, ConfirmResult};
use crate::ui::drawer::{Drawer, DrawerAction, Route};
use crate::ui::pages;
use crate::ui::terminal_guard::{install_panic_hook, TerminalGuard};
use crate::ui::toast::Toasts;

const DRAWER_WIDTH: u16 = 28;

/// Completions of background requests, applied on the UI loop
#[derive(Debug)]
pub enum AppEvent {
    Lookup {
        ticket: LookupTicket,
        result: Result<VehicleData, ApiError>,
    },
    SignIn(Result<AuthSession, ApiError>),
    SignUp(Result<SignUpOutcome, ApiError>),
    Recovery {
        email: String,
        result: Result<(), ApiError>,
    },
    UserRefreshed(Result<AuthUser, ApiError>),
}

pub struct App {
    config: Config,
    services: Services,
    session: SessionStore,
    capture: Box<dyn MediaCapture>,
    sink: Arc<dyn CheckInSink>,
    max_video: Duration,
    auth_screen: AuthScreen,
    drawer: Drawer,
    route: Route,
    checkin: CheckInScreen,
    confirm: ConfirmDialog,
    toasts: Toasts,
    events_tx: UnboundedSender<AppEvent>,
    events_rx: UnboundedReceiver<AppEvent>,
    should_quit: bool,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let services = Services::from_config(&config).context("Invalid backend configuration")?;
        tracing::info!(providers = %services.summary(), "Services initialized");

        let session = SessionStore::load(&config)?;
        let capture = CommandCapture::new(&config.capture, config.media_path());
        let sink = JsonFileSink::new(config.checkins_path());

        Ok(Self::with_parts(
            config,
            services,
            session,
            Box::new(capture),
            Arc::new(sink),
        ))
    }

    /// Assemble an app from explicit collaborators
    pub fn with_parts(
        config: Config,
        services: Services,
        session: SessionStore,
        capture: Box<dyn MediaCapture>,
        sink: Arc<dyn CheckInSink>,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            auth_screen: AuthScreen::new(config.ui.show_passwords),
            toasts: Toasts::new(Duration::from_secs(config.ui.toast_secs)),
            max_video: Duration::from_secs(config.capture.max_video_secs),
            config,
            services,
            session,
            capture,
            sink,
            drawer: Drawer::new(),
            route: Route::Home,
            checkin: CheckInScreen::new(),
            confirm: ConfirmDialog::new(),
            events_tx,
            events_rx,
            should_quit: false,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub fn route(&self) -> Route {
        self.route
    }

    pub async fn run(&mut self) -> Result<()> {
        install_panic_hook();
        let _guard = TerminalGuard::new()?;
        let backend = CrosstermBackend::new(io::stdout());
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;

        self.refresh_user();

        let tick_rate = Duration::from_millis(self.config.ui.refresh_rate_ms);

        while !self.should_quit {
            terminal.draw(|f| self.render(f))?;

            if event::poll(tick_rate)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code).await?;
                    }
                }
            }

            while let Ok(event) = self.events_rx.try_recv() {
                self.handle_event(event);
            }

            self.tick().await;
        }

        terminal.show_cursor()?;
        Ok(())
    }

    fn render(&mut self, frame: &mut Frame) {
        if !self.session.is_authenticated() {
            self.auth_screen.render(frame);
        } else {
            let area = frame.area();
            let content = if self.drawer.open {
                let chunks = Layout::default()
                    .direction(Direction::Horizontal)
                    .constraints([Constraint::Length(DRAWER_WIDTH), Constraint::Min(20)])
                    .split(area);
                self.drawer
                    .render(frame, chunks[0], self.session.user(), self.route);
                chunks[1]
            } else {
                area
            };

            match self.route {
                Route::Home => pages::render_home(frame, content, self.session.user()),
                Route::CheckIn => {
                    let recording = self.capture.recording_elapsed();
                    self.checkin.render(frame, content, recording);
                }
                Route::CheckOut => pages::render_checkout(frame, content),
                Route::Profile => pages::render_profile(frame, content, self.session.user()),
            }
        }

        self.confirm.render(frame);
        self.toasts.render(frame);
    }

    /// Periodic housekeeping between key events
    async fn tick(&mut self) {
        self.toasts.expire(Instant::now());

        let over_limit = self
            .capture
            .recording_elapsed()
            .map(|elapsed| elapsed >= self.max_video)
            .unwrap_or(false);
        if over_limit {
            tracing::info!("Maximum recording duration reached");
            self.stop_recording().await;
        }
    }

    // ─── Keys ───────────────────────────────────────────────────────────────

    pub async fn handle_key(&mut self, key: KeyCode) -> Result<()> {
        if self.confirm.visible {
            if let Some(result) = self.confirm.handle_key(key) {
                let purpose = self.confirm.purpose;
                self.confirm.hide();
                if result == ConfirmResult::Confirmed {
                    match purpose {
                        Some(ConfirmPurpose::AbandonCheckIn) => {
                            self.discard_checkin().await;
                            self.route = Route::Home;
                        }
                        Some(ConfirmPurpose::SignOut) => self.sign_out().await,
                        Some(ConfirmPurpose::Quit) => self.should_quit = true,
                        None => {}
                    }
                }
            }
            return Ok(());
        }

        if !self.session.is_authenticated() {
            if let Some(action) = self.auth_screen.handle_key(key) {
                self.dispatch_auth(action);
            }
            return Ok(());
        }

        if self.drawer.open {
            match self.drawer.handle_key(key) {
                Some(DrawerAction::Navigate(route)) => self.navigate(route),
                Some(DrawerAction::SignOut) => self.confirm.show(ConfirmPurpose::SignOut),
                Some(DrawerAction::Close) | None => {}
            }
            return Ok(());
        }

        if key == KeyCode::F(1) {
            self.drawer.show(self.route);
            return Ok(());
        }

        match self.route {
            Route::CheckIn => {
                self.checkin.recording = self.capture.is_recording();
                if let Some(action) = self.checkin.handle_key(key) {
                    self.dispatch_checkin(action).await;
                }
            }
            Route::Home | Route::CheckOut | Route::Profile => match key {
                KeyCode::Char('m') | KeyCode::Tab => self.drawer.show(self.route),
                KeyCode::Char('c') => self.navigate(Route::CheckIn),
                KeyCode::Char('q') => self.confirm.show(ConfirmPurpose::Quit),
                KeyCode::Esc if self.route != Route::Home => self.route = Route::Home,
                _ => {}
            },
        }
        Ok(())
    }

    fn navigate(&mut self, route: Route) {
        tracing::debug!(from = ?self.route, to = ?route, "Navigate");
        self.route = route;
    }

    // ─── Auth ───────────────────────────────────────────────────────────────

    fn dispatch_auth(&mut self, action: AuthAction) {
        if action == AuthAction::Quit {
            self.should_quit = true;
            return;
        }

        let provider = match self.services.auth() {
            Ok(provider) => provider,
            Err(err) => {
                self.auth_screen.busy = false;
                self.toasts.error("Autenticação", err.message());
                return;
            }
        };

        let tx = self.events_tx.clone();
        match action {
            AuthAction::SignIn(data) => {
                tracing::info!(email = %data.email, "Signing in");
                tokio::spawn(async move {
                    let result = provider.sign_in(&data).await;
                    let _ = tx.send(AppEvent::SignIn(result));
                });
            }
            AuthAction::SignUp(data) => {
                tracing::info!(email = %data.email, "Signing up");
                tokio::spawn(async move {
                    let result = provider.sign_up(&data).await;
                    let _ = tx.send(AppEvent::SignUp(result));
                });
            }
            AuthAction::ForgotPassword(email) => {
                tracing::info!(email = %email, "Requesting password recovery");
                tokio::spawn(async move {
                    let result = provider.forgot_password(&email).await;
                    let _ = tx.send(AppEvent::Recovery { email, result });
                });
            }
            AuthAction::Quit => {}
        }
    }

    /// Re-fetch the stored user so the drawer shows current profile data
    fn refresh_user(&mut self) {
        let Some(session) = self.session.current().cloned() else {
            return;
        };
        let Ok(provider) = self.services.auth() else {
            return;
        };
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = provider.current_user(&session).await;
            let _ = tx.send(AppEvent::UserRefreshed(result));
        });
    }

    fn signed_in(&mut self, session: AuthSession) {
        let name = session.user.display_name();
        if let Err(err) = self.session.set(session) {
            tracing::warn!(error = %err, "Failed to persist session");
        }
        self.auth_screen.switch(AuthMode::SignIn);
        self.route = Route::Home;
        self.toasts.success("Bem-vindo!", name);
    }

    async fn sign_out(&mut self) {
        if let Some(session) = self.session.current().cloned() {
            if let Ok(provider) = self.services.auth() {
                if let Err(err) = provider.sign_out(&session).await {
                    tracing::warn!(error = %err, "Remote sign-out failed; clearing local session");
                }
            }
        }
        if let Err(err) = self.session.clear() {
            tracing::warn!(error = %err, "Failed to remove stored session");
        }
        self.discard_checkin().await;
        self.drawer.open = false;
        self.route = Route::Home;
        self.auth_screen.switch(AuthMode::SignIn);
        self.toasts.success("Até logo", "Você saiu do sistema com sucesso");
    }

    // ─── Check-in ───────────────────────────────────────────────────────────

    /// Drop the session along with any clip still being recorded
    async fn discard_checkin(&mut self) {
        self.capture.cancel_recording().await;
        self.checkin.reset();
    }

    fn checkin_has_progress(&self) -> bool {
        !self.checkin.plate_input().is_empty()
            || !self.checkin.session.media().is_empty()
            || !self.checkin.session.steps().is_empty()
    }

    async fn dispatch_checkin(&mut self, action: CheckInAction) {
        match action {
            CheckInAction::Lookup(ticket) => self.start_lookup(ticket),
            CheckInAction::TakePhoto => match self.capture.take_photo().await {
                Ok(uri) => self.media_added(MediaItem::image(uri)),
                Err(err) => self.toasts.error(err.title(), err.to_string()),
            },
            CheckInAction::StartRecording => match self.capture.start_recording() {
                Ok(()) => self.toasts.info(
                    "Gravando",
                    format!("Máximo de {} segundos", self.max_video.as_secs()),
                ),
                Err(err) => self.toasts.error(err.title(), err.to_string()),
            },
            CheckInAction::StopRecording => self.stop_recording().await,
            CheckInAction::Import(path) => match import_file(&path) {
                Ok(item) => self.media_added(item),
                Err(err) => self.toasts.error(err.title(), err.to_string()),
            },
            CheckInAction::Submit => self.submit_checkin().await,
            CheckInAction::Notice { title, message } => self.toasts.error(title, message),
            CheckInAction::Leave => {
                if self.checkin_has_progress() {
                    self.confirm.show(ConfirmPurpose::AbandonCheckIn);
                } else {
                    self.route = Route::Home;
                }
            }
        }
    }

    fn start_lookup(&mut self, ticket: LookupTicket) {
        let provider = match self.services.vehicles() {
            Ok(provider) => provider,
            Err(err) => {
                self.apply_lookup(ticket, Err(err));
                return;
            }
        };
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = lookup::fetch(provider.as_ref(), &ticket).await;
            let _ = tx.send(AppEvent::Lookup { ticket, result });
        });
    }

    fn apply_lookup(&mut self, ticket: LookupTicket, result: Result<VehicleData, ApiError>) {
        let outcome = self.checkin.apply_lookup(&ticket, result);
        if let Some((title, message)) = outcome.notice() {
            match outcome {
                LookupOutcome::Found => self.toasts.success(title, message),
                _ => self.toasts.error(title, message),
            }
        }
    }

    fn media_added(&mut self, item: MediaItem) {
        tracing::info!(kind = ?item.kind, uri = %item.uri, "Media added");
        let label = item.kind.label();
        self.checkin.add_media(item);
        self.toasts
            .success(format!("{} adicionada", label), "Mídia anexada ao check-in");
    }

    async fn stop_recording(&mut self) {
        match self.capture.stop_recording().await {
            Ok(uri) => self.media_added(MediaItem::video(uri)),
            Err(err) => self.toasts.error(err.title(), err.to_string()),
        }
    }

    async fn submit_checkin(&mut self) {
        match finalize(&mut self.checkin.session, self.sink.as_ref()).await {
            Ok(receipt) => {
                self.discard_checkin().await;
                self.route = Route::Home;
                self.toasts.success(
                    "Check-in finalizado",
                    format!("Veículo {} registrado", receipt.plate),
                );
            }
            Err(err) => {
                tracing::warn!(error = %err, "Check-in submission failed");
                self.checkin.submit_failed();
                self.toasts.error("Erro ao finalizar", err.to_string());
            }
        }
    }

    // ─── Background completions ─────────────────────────────────────────────

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Lookup { ticket, result } => self.apply_lookup(ticket, result),
            AppEvent::SignIn(Ok(session)) => self.signed_in(session),
            AppEvent::SignIn(Err(err)) => {
                self.auth_screen.busy = false;
                self.toasts.error("Erro ao entrar", err.message());
            }
            AppEvent::SignUp(Ok(outcome)) => match outcome.session {
                Some(session) => self.signed_in(session),
                None => {
                    self.auth_screen.switch(AuthMode::SignIn);
                    self.toasts.info(
                        "Cadastro realizado",
                        "Verifique seu e-mail para confirmar a conta",
                    );
                }
            },
            AppEvent::SignUp(Err(err)) => {
                self.auth_screen.busy = false;
                self.toasts.error("Erro ao cadastrar", err.message());
            }
            AppEvent::Recovery { email, result } => match result {
                Ok(()) => {
                    self.auth_screen.switch(AuthMode::SignIn);
                    self.toasts.success(
                        "E-mail enviado",
                        format!("Enviamos um link de recuperação para {}", email),
                    );
                }
                Err(err) => {
                    self.auth_screen.busy = false;
                    self.toasts.error("Erro ao enviar e-mail", err.message());
                }
            },
            AppEvent::UserRefreshed(Ok(user)) => {
                if let Err(err) = self.session.update_user(user) {
                    tracing::warn!(error = %err, "Failed to persist refreshed user");
                }
            }
            AppEvent::UserRefreshed(Err(err)) if err.is_auth_error() => {
                tracing::info!(error = %err, "Stored session rejected");
                if let Err(err) = self.session.clear() {
                    tracing::warn!(error = %err, "Failed to remove stored session");
                }
                self.toasts
                    .info("Sessão expirada", "Entre novamente para continuar");
            }
            AppEvent::UserRefreshed(Err(err)) => {
                tracing::warn!(error = %err, "Could not refresh user profile");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::providers::auth::SignInData;
    use crate::api::{AuthProvider, MockAuthProvider, MockVehicleProvider};
    use crate::checkin::{CheckInStep, CustomerData, MediaKind, MockCapture};
    use tempfile::TempDir;

    struct Harness {
        app: App,
        auth: MockAuthProvider,
        vehicles: MockVehicleProvider,
        _dir: TempDir,
    }

    fn harness() -> Harness {
        harness_with(Box::new(MockCapture::new()))
    }

    fn harness_with(capture: Box<dyn MediaCapture>) -> Harness {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.paths.state = dir.path().to_string_lossy().to_string();

        let auth = MockAuthProvider::new();
        auth.add_user("ana@oficina.com", "segredo", Some("Ana Souza"));
        let vehicles = MockVehicleProvider::new();
        vehicles.insert(VehicleData {
            id: "v1".to_string(),
            plate: "ABC1234".to_string(),
            brand: Some("Fiat".to_string()),
            model: Some("Uno".to_string()),
            year: Some(2015),
            color: None,
            customer_id: "c1".to_string(),
            customer: Some(CustomerData {
                id: "c1".to_string(),
                name: "Maria Silva".to_string(),
                phone: String::new(),
                email: String::new(),
                address: String::new(),
            }),
        });

        let services = Services::new()
            .with_auth(Arc::new(auth.clone()))
            .with_vehicles(Arc::new(vehicles.clone()));
        let sink = JsonFileSink::new(config.checkins_path());
        let app = App::with_parts(
            config,
            services,
            SessionStore::in_memory(),
            capture,
            Arc::new(sink),
        );

        Harness {
            app,
            auth,
            vehicles,
            _dir: dir,
        }
    }

    fn credentials(email: &str, password: &str) -> SignInData {
        SignInData {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    async fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_key(KeyCode::Char(c)).await.unwrap();
        }
    }

    async fn next_event(app: &mut App) {
        let event = app.events_rx.recv().await.unwrap();
        app.handle_event(event);
    }

    async fn signed_in() -> Harness {
        signed_in_with(Box::new(MockCapture::new())).await
    }

    async fn signed_in_with(capture: Box<dyn MediaCapture>) -> Harness {
        let mut h = harness_with(capture);
        let session = h
            .auth
            .sign_in(&credentials("ana@oficina.com", "segredo"))
            .await
            .unwrap();
        h.app.signed_in(session);
        h
    }

    /// Look up the seeded plate and move on to the media step
    async fn open_media_step(h: &mut Harness) {
        h.app.navigate(Route::CheckIn);
        type_text(&mut h.app, "abc1234").await;
        h.app.handle_key(KeyCode::Enter).await.unwrap();
        next_event(&mut h.app).await;
        h.app.handle_key(KeyCode::PageDown).await.unwrap();
        assert_eq!(h.app.checkin.step(), CheckInStep::Media);
    }

    #[tokio::test]
    async fn test_sign_in_through_auth_screen() {
        let mut h = harness();
        assert!(!h.app.is_authenticated());

        type_text(&mut h.app, "ana@oficina.com").await;
        h.app.handle_key(KeyCode::Enter).await.unwrap();
        type_text(&mut h.app, "segredo").await;
        h.app.handle_key(KeyCode::Enter).await.unwrap();
        next_event(&mut h.app).await;

        assert!(h.app.is_authenticated());
        assert_eq!(h.app.route(), Route::Home);
        assert_eq!(h.app.toasts.latest().unwrap().message, "Ana Souza");
    }

    #[tokio::test]
    async fn test_wrong_password_stays_on_auth_screen() {
        let mut h = harness();
        type_text(&mut h.app, "ana@oficina.com").await;
        h.app.handle_key(KeyCode::Enter).await.unwrap();
        type_text(&mut h.app, "errada").await;
        h.app.handle_key(KeyCode::Enter).await.unwrap();
        next_event(&mut h.app).await;

        assert!(!h.app.is_authenticated());
        assert!(!h.app.auth_screen.busy);
        let toast = h.app.toasts.latest().unwrap();
        assert_eq!(toast.title, "Erro ao entrar");
        assert_eq!(toast.message, "Invalid login credentials");
    }

    #[tokio::test]
    async fn test_missing_auth_provider_is_reported() {
        let mut h = harness();
        h.app.services = Services::new();
        type_text(&mut h.app, "ana@oficina.com").await;
        h.app.handle_key(KeyCode::Enter).await.unwrap();
        type_text(&mut h.app, "segredo").await;
        h.app.handle_key(KeyCode::Enter).await.unwrap();

        assert!(!h.app.auth_screen.busy);
        assert_eq!(
            h.app.toasts.latest().unwrap().message,
            "Serviço auth não configurado"
        );
    }

    #[tokio::test]
    async fn test_full_checkin() {
        let mut h = signed_in().await;
        h.app.handle_key(KeyCode::Char('c')).await.unwrap();
        assert_eq!(h.app.route(), Route::CheckIn);

        type_text(&mut h.app, "abc1234").await;
        h.app.handle_key(KeyCode::Enter).await.unwrap();
        next_event(&mut h.app).await;
        assert_eq!(h.vehicles.requests(), vec!["ABC1234".to_string()]);
        assert!(h.app.checkin.vehicle().is_some());
        assert_eq!(h.app.toasts.latest().unwrap().title, "Veículo encontrado");

        h.app.handle_key(KeyCode::PageDown).await.unwrap();
        assert_eq!(h.app.checkin.step(), CheckInStep::Media);

        h.app.handle_key(KeyCode::Char('f')).await.unwrap();
        h.app.handle_key(KeyCode::Char('v')).await.unwrap();
        h.app.handle_key(KeyCode::Char('s')).await.unwrap();
        assert_eq!(h.app.checkin.session.media().len(), 2);

        for _ in 0..5 {
            h.app.handle_key(KeyCode::PageDown).await.unwrap();
        }
        assert_eq!(h.app.checkin.step(), CheckInStep::Finish);

        h.app.handle_key(KeyCode::Enter).await.unwrap();
        assert_eq!(h.app.route(), Route::Home);
        assert_eq!(h.app.checkin.step(), CheckInStep::Plate);
        assert_eq!(
            h.app.toasts.latest().unwrap().message,
            "Veículo ABC1234 registrado"
        );

        let written = std::fs::read_dir(h.app.config.checkins_path())
            .unwrap()
            .count();
        assert_eq!(written, 1);
    }

    #[tokio::test]
    async fn test_unknown_plate() {
        let mut h = signed_in().await;
        h.app.navigate(Route::CheckIn);
        type_text(&mut h.app, "zzz9999").await;
        h.app.handle_key(KeyCode::Enter).await.unwrap();
        next_event(&mut h.app).await;

        assert!(h.app.checkin.vehicle().is_none());
        assert_eq!(h.app.toasts.latest().unwrap().title, "Veículo não encontrado");
    }

    #[tokio::test]
    async fn test_lookup_without_backend() {
        let mut h = signed_in().await;
        h.app.services = Services::new();
        h.app.navigate(Route::CheckIn);
        type_text(&mut h.app, "abc1234").await;
        h.app.handle_key(KeyCode::Enter).await.unwrap();

        let toast = h.app.toasts.latest().unwrap();
        assert_eq!(toast.title, "Erro na busca");
        assert_eq!(toast.message, "Serviço vehicles não configurado");
        assert!(!h.app.checkin.session.lookup().is_in_flight());
    }

    #[tokio::test]
    async fn test_leaving_checkin_asks_first() {
        let mut h = signed_in().await;
        h.app.navigate(Route::CheckIn);
        h.app.handle_key(KeyCode::Esc).await.unwrap();
        assert_eq!(h.app.route(), Route::Home);

        h.app.navigate(Route::CheckIn);
        type_text(&mut h.app, "abc").await;
        h.app.handle_key(KeyCode::Esc).await.unwrap();
        assert!(h.app.confirm.visible);
        h.app.handle_key(KeyCode::Char('n')).await.unwrap();
        assert_eq!(h.app.route(), Route::CheckIn);
        assert_eq!(h.app.checkin.plate_input(), "ABC");

        h.app.handle_key(KeyCode::Esc).await.unwrap();
        h.app.handle_key(KeyCode::Char('s')).await.unwrap();
        assert_eq!(h.app.route(), Route::Home);
        assert_eq!(h.app.checkin.plate_input(), "");
    }

    #[tokio::test]
    async fn test_sign_out_from_drawer() {
        let mut h = signed_in().await;
        h.app.handle_key(KeyCode::Char('m')).await.unwrap();
        assert!(h.app.drawer.open);
        for _ in 0..4 {
            h.app.handle_key(KeyCode::Down).await.unwrap();
        }
        h.app.handle_key(KeyCode::Enter).await.unwrap();
        assert!(h.app.confirm.visible);
        h.app.handle_key(KeyCode::Char('s')).await.unwrap();

        assert!(!h.app.is_authenticated());
        assert_eq!(h.auth.signed_out().len(), 1);
        assert_eq!(
            h.app.toasts.latest().unwrap().message,
            "Você saiu do sistema com sucesso"
        );
    }

    #[tokio::test]
    async fn test_sign_up_pending_confirmation() {
        let mut h = harness();
        h.auth.require_confirmation(true);
        h.app.handle_key(KeyCode::F(2)).await.unwrap();
        type_text(&mut h.app, "Bruno Lima").await;
        h.app.handle_key(KeyCode::Tab).await.unwrap();
        type_text(&mut h.app, "bruno@oficina.com").await;
        h.app.handle_key(KeyCode::Tab).await.unwrap();
        type_text(&mut h.app, "123456").await;
        h.app.handle_key(KeyCode::Tab).await.unwrap();
        type_text(&mut h.app, "123456").await;
        h.app.handle_key(KeyCode::Enter).await.unwrap();
        next_event(&mut h.app).await;

        assert!(!h.app.is_authenticated());
        assert_eq!(h.app.auth_screen.mode, AuthMode::SignIn);
        assert_eq!(h.app.toasts.latest().unwrap().title, "Cadastro realizado");
    }

    #[tokio::test]
    async fn test_expired_session_is_cleared_on_refresh() {
        let mut h = signed_in().await;
        h.app
            .handle_event(AppEvent::UserRefreshed(Err(ApiError::unauthorized(
                "mock",
                "JWT expired",
            ))));
        assert!(!h.app.is_authenticated());
        assert_eq!(h.app.toasts.latest().unwrap().title, "Sessão expirada");
    }

    #[tokio::test]
    async fn test_recording_blocks_leaving_media_step() {
        let mut h = signed_in().await;
        open_media_step(&mut h).await;

        h.app.handle_key(KeyCode::Char('f')).await.unwrap();
        h.app.handle_key(KeyCode::Char('v')).await.unwrap();
        assert!(h.app.capture.is_recording());

        for key in [KeyCode::PageDown, KeyCode::Enter, KeyCode::Esc] {
            h.app.handle_key(key).await.unwrap();
            assert_eq!(h.app.checkin.step(), CheckInStep::Media);
            assert_eq!(h.app.toasts.latest().unwrap().title, "Gravação em andamento");
        }

        h.app.handle_key(KeyCode::Char('s')).await.unwrap();
        assert!(!h.app.capture.is_recording());
        assert_eq!(h.app.checkin.session.media().len(), 2);

        h.app.handle_key(KeyCode::PageDown).await.unwrap();
        assert_eq!(h.app.checkin.step(), CheckInStep::FuelAndItems);
    }

    #[tokio::test]
    async fn test_max_duration_stops_recording_on_tick() {
        let mut h = signed_in().await;
        open_media_step(&mut h).await;

        h.app.handle_key(KeyCode::Char('v')).await.unwrap();
        h.app.tick().await;
        assert!(h.app.capture.is_recording());

        h.app.max_video = Duration::ZERO;
        h.app.tick().await;

        assert!(!h.app.capture.is_recording());
        let media = h.app.checkin.session.media();
        assert_eq!(media.len(), 1);
        assert_eq!(media.get(0).map(|item| item.kind), Some(MediaKind::Video));
    }

    #[tokio::test]
    async fn test_submitted_checkin_does_not_keep_recording() {
        let mut h = signed_in().await;
        open_media_step(&mut h).await;
        h.app.handle_key(KeyCode::Char('f')).await.unwrap();
        while h.app.checkin.step() != CheckInStep::Finish {
            h.app.handle_key(KeyCode::PageDown).await.unwrap();
        }

        // A recorder still running when the check-in is submitted
        h.app.capture.start_recording().unwrap();
        h.app.handle_key(KeyCode::Enter).await.unwrap();
        assert_eq!(h.app.route(), Route::Home);
        assert!(!h.app.capture.is_recording());

        h.app.max_video = Duration::ZERO;
        h.app.tick().await;
        assert!(h.app.checkin.session.media().is_empty());
    }

    #[tokio::test]
    async fn test_sign_out_cancels_short_recording() {
        let capture = MockCapture::new().with_min_video(Duration::from_secs(1));
        let mut h = signed_in_with(Box::new(capture)).await;
        open_media_step(&mut h).await;

        h.app.handle_key(KeyCode::Char('v')).await.unwrap();
        h.app.handle_key(KeyCode::Char('s')).await.unwrap();
        assert_eq!(h.app.toasts.latest().unwrap().title, "Gravação muito curta");
        assert!(h.app.capture.is_recording());

        h.app.sign_out().await;

        assert!(!h.app.capture.is_recording());
        assert!(h.app.checkin.session.media().is_empty());
        assert!(h.app.capture.start_recording().is_ok());
    }
}
