use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing_subscriber::EnvFilter;
use vof_console::config::normalize_api_url;
use vof_console::forms::{
    AudioForm, EventForm, InFlight, InviteForm, LiveStartForm, NotificationForm, PostForm, SermonForm, Upload,
    ValidationErrors,
};
use vof_console::models::{AudioCategory, DailySummary, DonationType, PaymentMethod, Period, PostCategory, PostType};
use vof_console::routes::{self, GuardOutcome};
use vof_console::services::donations::{DonationSummary, donations_csv, search_donations};
use vof_console::services::events::{EventFilter, count_events, filter_events};
use vof_console::services::sermons::search_sermons;
use vof_console::services::{AudioQuery, DonationQuery, Page, PostQuery, SermonQuery, UserQuery};
use vof_console::state::theme::TerminalThemeProbe;
use vof_console::{
    ApiClient, ApiError, ConfigError, ConsoleConfig, FileStore, HttpAuthBackend, Notice, Role, Route, SessionHandle,
    SessionStore, SharedStore, Theme, ThemeStore,
};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Failed(Notice),
    #[error("{}", render_fields(.0))]
    Invalid(ValidationErrors),
    #[error("not signed in; run `vof-admin login` first")]
    NotSignedIn,
    #[error("{0} is still loading the session")]
    Loading(&'static str),
    #[error("I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("invalid daily summary `{0}`; expected DATE=TEXT")]
    InvalidSummary(String),
}

/// One line per invalid field.
fn render_fields(errors: &ValidationErrors) -> String {
    errors.iter().map(|(field, message)| format!("{field}: {message}")).collect::<Vec<_>>().join("\n")
}

/// Map a failed call to a notice carrying the server message or `fallback`.
fn failed(fallback: &'static str) -> impl FnOnce(ApiError) -> CliError {
    move |err| match err {
        ApiError::Validation(errors) => CliError::Invalid(errors),
        other => CliError::Failed(Notice::from_error(&other, fallback)),
    }
}

#[derive(Parser, Debug)]
#[command(name = "vof-admin", about = "Voice of Faith administration console")]
struct Cli {
    #[arg(long, env = "VOF_API_URL")]
    api_url: Option<String>,

    #[arg(long, env = "VOF_STATE_DIR")]
    state_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        email: String,
        #[arg(long, env = "VOF_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    Logout,
    Whoami,
    ResendVerification {
        email: String,
    },
    /// Screens available to the signed-in user.
    Nav,
    /// Resolve a console path through the route guard.
    Open {
        path: String,
    },
    Theme(ThemeCommand),
    Dashboard,
    Audios(AudioCommand),
    Sermons(SermonCommand),
    Events(EventCommand),
    Posts(PostCommand),
    Users(UserCommand),
    Live(LiveCommand),
    Donations(DonationCommand),
    Stats(StatsCommand),
}

#[derive(Args, Debug)]
struct ThemeCommand {
    #[command(subcommand)]
    command: ThemeSubcommand,
}

#[derive(Subcommand, Debug)]
enum ThemeSubcommand {
    Show,
    Toggle,
    Set { theme: Theme },
    System,
}

#[derive(Args, Debug)]
struct AudioCommand {
    #[command(subcommand)]
    command: AudioSubcommand,
}

#[derive(Subcommand, Debug)]
enum AudioSubcommand {
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 20)]
        limit: u32,
        #[arg(long, value_parser = parse_wire::<AudioCategory>)]
        category: Option<AudioCategory>,
    },
    Get {
        id: String,
    },
    Create {
        #[arg(long)]
        title: String,
        #[arg(long, value_parser = parse_wire::<AudioCategory>, default_value = "teaching")]
        category: AudioCategory,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        audio: Option<PathBuf>,
        #[arg(long)]
        thumbnail: Option<PathBuf>,
    },
    Update {
        id: String,
        #[arg(long)]
        title: String,
        #[arg(long, value_parser = parse_wire::<AudioCategory>, default_value = "teaching")]
        category: AudioCategory,
        #[arg(long)]
        description: Option<String>,
    },
    Delete {
        id: String,
    },
    Play {
        id: String,
    },
    Download {
        id: String,
    },
}

#[derive(Args, Debug)]
struct SermonCommand {
    #[command(subcommand)]
    command: SermonSubcommand,
}

#[derive(Subcommand, Debug)]
enum SermonSubcommand {
    List {
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        month: Option<u8>,
        #[arg(long, default_value = "")]
        search: String,
    },
    Get {
        id: String,
    },
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        date: String,
        #[arg(long)]
        image: Option<PathBuf>,
        #[arg(long)]
        pdf: Option<PathBuf>,
    },
    Update {
        id: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        date: String,
    },
    Delete {
        id: String,
    },
    Download {
        id: String,
    },
    Stats {
        #[arg(long)]
        year: Option<i32>,
    },
}

#[derive(Args, Debug)]
struct EventCommand {
    #[command(subcommand)]
    command: EventSubcommand,
}

#[derive(Subcommand, Debug)]
enum EventSubcommand {
    List {
        #[arg(long, default_value = "all")]
        filter: EventFilter,
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 50)]
        limit: u32,
    },
    Get {
        id: String,
    },
    Create(EventArgs),
    Update {
        id: String,
        #[command(flatten)]
        event: EventArgs,
    },
    Delete {
        id: String,
    },
}

#[derive(Args, Debug)]
struct EventArgs {
    #[arg(long)]
    title: String,
    #[arg(long)]
    start_date: String,
    #[arg(long)]
    end_date: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    location: Option<String>,
    #[arg(long)]
    image: Option<PathBuf>,
    /// Daily recap as DATE=TEXT; repeatable.
    #[arg(long = "summary")]
    summaries: Vec<String>,
}

#[derive(Args, Debug)]
struct PostCommand {
    #[command(subcommand)]
    command: PostSubcommand,
}

#[derive(Subcommand, Debug)]
enum PostSubcommand {
    List {
        #[arg(long, value_parser = parse_wire::<PostCategory>)]
        category: Option<PostCategory>,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 50)]
        limit: u32,
    },
    Get {
        id: String,
    },
    Create {
        #[arg(long)]
        content: String,
        #[arg(long = "type", value_parser = parse_wire::<PostType>, default_value = "image")]
        kind: PostType,
        #[arg(long, value_parser = parse_wire::<PostCategory>, default_value = "pensee")]
        category: PostCategory,
        #[arg(long)]
        media: Option<PathBuf>,
    },
    Update {
        id: String,
        #[arg(long)]
        content: String,
        #[arg(long = "type", value_parser = parse_wire::<PostType>, default_value = "image")]
        kind: PostType,
        #[arg(long, value_parser = parse_wire::<PostCategory>, default_value = "pensee")]
        category: PostCategory,
    },
    Delete {
        id: String,
    },
    Like {
        id: String,
    },
}

#[derive(Args, Debug)]
struct UserCommand {
    #[command(subcommand)]
    command: UserSubcommand,
}

#[derive(Subcommand, Debug)]
enum UserSubcommand {
    List {
        #[arg(long)]
        role: Option<Role>,
    },
    Get {
        id: String,
    },
    Invite {
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "media")]
        role: Role,
    },
    Role {
        id: String,
        role: Role,
    },
    Resend {
        id: String,
    },
    Delete {
        id: String,
    },
}

#[derive(Args, Debug)]
struct LiveCommand {
    #[command(subcommand)]
    command: LiveSubcommand,
}

#[derive(Subcommand, Debug)]
enum LiveSubcommand {
    Status,
    Start {
        #[arg(long)]
        title: String,
        #[arg(long)]
        url: String,
    },
    Stop,
    Notify {
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        body: Option<String>,
    },
}

#[derive(Args, Debug)]
struct DonationCommand {
    #[command(subcommand)]
    command: DonationSubcommand,
}

#[derive(Args, Debug, Clone, Copy)]
struct DonationFilters {
    #[arg(long = "type", value_parser = parse_wire::<DonationType>)]
    kind: Option<DonationType>,
    #[arg(long = "method", value_parser = parse_wire::<PaymentMethod>)]
    payment_method: Option<PaymentMethod>,
    #[arg(long)]
    period: Option<Period>,
}

impl DonationFilters {
    fn query(self) -> DonationQuery {
        DonationQuery {
            kind: self.kind,
            payment_method: self.payment_method,
            period: self.period,
            ..DonationQuery::default()
        }
    }
}

#[derive(Subcommand, Debug)]
enum DonationSubcommand {
    List {
        #[command(flatten)]
        filters: DonationFilters,
        #[arg(long, default_value = "")]
        search: String,
    },
    Get {
        id: String,
    },
    Stats {
        #[arg(long)]
        period: Option<Period>,
    },
    /// Write the ledger as CSV.
    Export {
        #[command(flatten)]
        filters: DonationFilters,
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long, help = "Output file path, or - for stdout", default_value = "-")]
        output: String,
        #[arg(long, default_value_t = false, help = "Render locally from the filtered list")]
        local: bool,
    },
}

#[derive(Args, Debug)]
struct StatsCommand {
    #[command(subcommand)]
    command: StatsSubcommand,
}

#[derive(Subcommand, Debug)]
enum StatsSubcommand {
    Overview,
    Audios,
    Users,
    Engagement,
}

/// Parse a backend wire name (`teaching`, `creditCard`, ...) into a model enum.
fn parse_wire<T: DeserializeOwned>(raw: &str) -> Result<T, String> {
    serde_json::from_value(Value::String(raw.to_owned())).map_err(|_| format!("unknown value `{raw}`"))
}

// =============================================================================
// APP
// =============================================================================

struct App {
    api: ApiClient,
    session: SessionStore<HttpAuthBackend>,
    storage: SharedStore,
    submissions: InFlight,
}

impl App {
    fn new(config: &ConsoleConfig) -> Result<Self, CliError> {
        let storage: SharedStore = Arc::new(FileStore::new(config.state_dir.clone()));
        let handle = SessionHandle::restore(storage.clone());
        let navigator = Arc::new(|route: Route| {
            tracing::info!(route = route.path(), "forced navigation");
            if route == Route::Login {
                eprintln!("{}", Notice::info("Session expired; sign in again with `vof-admin login`"));
            }
        });
        let api = ApiClient::new(config, handle.clone(), navigator).map_err(failed("Failed to start the HTTP client"))?;
        let session = SessionStore::new(handle, HttpAuthBackend::new(api.clone()));
        Ok(Self { api, session, storage, submissions: InFlight::new() })
    }

    /// Revalidate the stored session and apply the guard of `route`.
    ///
    /// Returns `false` when the guard redirected elsewhere; the redirect
    /// target has been shown instead.
    async fn enter(&self, route: Route) -> Result<bool, CliError> {
        self.session.check_auth().await;
        match routes::guard(route, &self.session.snapshot()) {
            GuardOutcome::Render => Ok(true),
            GuardOutcome::Loading => Err(CliError::Loading(route.title())),
            GuardOutcome::Redirect(Route::Login) => Err(CliError::NotSignedIn),
            GuardOutcome::Redirect(target) => {
                tracing::info!(from = route.path(), to = target.path(), "insufficient role; redirecting");
                show_dashboard(self).await?;
                Ok(false)
            }
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = ConsoleConfig::from_env()?;
    if let Some(url) = cli.api_url {
        config.api_url = normalize_api_url(&url)?;
    }
    if let Some(dir) = cli.state_dir {
        config.state_dir = dir;
    }
    tracing::debug!(api_url = %config.api_url, state_dir = %config.state_dir.display(), "console configured");

    let app = App::new(&config)?;
    match cli.command {
        Command::Login { email, password } => run_login(&app, &email, password).await,
        Command::Logout => {
            app.session.logout().await;
            notify(&Notice::success("Signed out"));
            Ok(())
        }
        Command::Whoami => run_whoami(&app).await,
        Command::ResendVerification { email } => {
            app.session
                .resend_verification_email(&email)
                .await
                .map_err(failed("Failed to resend the verification email"))?;
            notify(&Notice::success("Verification email sent"));
            Ok(())
        }
        Command::Nav => run_nav(&app).await,
        Command::Open { path } => run_open(&app, &path).await,
        Command::Theme(theme) => run_theme(&app, theme),
        Command::Dashboard => {
            if app.enter(Route::Dashboard).await? {
                show_dashboard(&app).await?;
            }
            Ok(())
        }
        Command::Audios(cmd) => run_audios(&app, cmd).await,
        Command::Sermons(cmd) => run_sermons(&app, cmd).await,
        Command::Events(cmd) => run_events(&app, cmd).await,
        Command::Posts(cmd) => run_posts(&app, cmd).await,
        Command::Users(cmd) => run_users(&app, cmd).await,
        Command::Live(cmd) => run_live(&app, cmd).await,
        Command::Donations(cmd) => run_donations(&app, cmd).await,
        Command::Stats(cmd) => run_stats(&app, cmd).await,
    }
}

// =============================================================================
// SESSION
// =============================================================================

async fn run_login(app: &App, email: &str, password: Option<String>) -> Result<(), CliError> {
    app.session.check_auth().await;
    if let GuardOutcome::Redirect(_) = routes::guard(Route::Login, &app.session.snapshot()) {
        notify(&Notice::info("Already signed in"));
        return run_whoami(app).await;
    }

    let password = match password {
        Some(p) => p,
        None => prompt_password()?,
    };
    let user = app.session.login(email, &password).await.map_err(|_| {
        let message = app.session.snapshot().error.unwrap_or_else(|| "Login failed".to_owned());
        CliError::Failed(Notice::error(message))
    })?;
    notify(&Notice::success(format!("Signed in as {} ({})", user.display_name, user.role.label())));
    Ok(())
}

fn prompt_password() -> Result<String, CliError> {
    eprint!("Password: ");
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_owned())
}

async fn run_whoami(app: &App) -> Result<(), CliError> {
    app.session.check_auth().await;
    let session = app.session.snapshot();
    match session.user.filter(|_| session.is_authenticated) {
        Some(user) => print_json(&user),
        None => Err(CliError::NotSignedIn),
    }
}

async fn run_nav(app: &App) -> Result<(), CliError> {
    app.session.check_auth().await;
    let menu: Vec<Value> = routes::navigation(&app.session.snapshot())
        .into_iter()
        .map(|route| json!({ "path": route.path(), "title": route.title() }))
        .collect();
    print_json(&menu)
}

async fn run_open(app: &App, path: &str) -> Result<(), CliError> {
    app.session.check_auth().await;
    let (route, outcome) = routes::resolve(path, &app.session.snapshot());
    let outcome = match outcome {
        GuardOutcome::Render => json!({ "render": route.path() }),
        GuardOutcome::Loading => json!({ "loading": route.path() }),
        GuardOutcome::Redirect(target) => json!({ "redirect": target.path() }),
    };
    print_json(&json!({ "screen": route.title(), "outcome": outcome }))
}

fn run_theme(app: &App, theme: ThemeCommand) -> Result<(), CliError> {
    let store = ThemeStore::restore(app.storage.clone(), Arc::new(TerminalThemeProbe));
    let current = store.init();
    match theme.command {
        ThemeSubcommand::Show => {}
        ThemeSubcommand::Toggle => {
            store.toggle();
        }
        ThemeSubcommand::Set { theme } => store.set(theme),
        ThemeSubcommand::System => {
            store.use_system_theme();
        }
    }
    tracing::debug!(previous = %current, next = %store.theme(), "theme updated");
    print_json(&store.state())
}

async fn show_dashboard(app: &App) -> Result<(), CliError> {
    let overview = app.api.stats().overview().await.map_err(failed("Failed to load the dashboard"))?;
    print_json(&overview)
}

// =============================================================================
// CONTENT
// =============================================================================

async fn load_upload(path: Option<&Path>) -> Result<Option<Upload>, CliError> {
    match path {
        Some(path) => Upload::from_path(path).await.map(Some).map_err(failed("Failed to read the file")),
        None => Ok(None),
    }
}

async fn run_audios(app: &App, cmd: AudioCommand) -> Result<(), CliError> {
    if !app.enter(Route::Audios).await? {
        return Ok(());
    }
    let audios = app.api.audios();
    match cmd.command {
        AudioSubcommand::List { page, limit, category } => {
            let page = audios
                .list(AudioQuery { page, limit, category })
                .await
                .map_err(failed("Failed to load audios"))?;
            print_page(&page)
        }
        AudioSubcommand::Get { id } => print_json(&audios.get(&id).await.map_err(failed("Audio not found"))?),
        AudioSubcommand::Create { title, category, description, audio, thumbnail } => {
            let form = AudioForm {
                title,
                description,
                category,
                audio: load_upload(audio.as_deref()).await?,
                thumbnail: load_upload(thumbnail.as_deref()).await?,
            };
            let created = app.submissions.submit(audios.create(&form)).await.map_err(failed("Upload failed"))?;
            notify(&Notice::success("Audio uploaded"));
            print_json(&created)
        }
        AudioSubcommand::Update { id, title, category, description } => {
            let form = AudioForm { title, description, category, ..AudioForm::default() };
            let updated = app.submissions.submit(audios.update(&id, &form)).await.map_err(failed("Update failed"))?;
            notify(&Notice::success("Audio updated"));
            print_json(&updated)
        }
        AudioSubcommand::Delete { id } => {
            audios.delete(&id).await.map_err(failed("Delete failed"))?;
            notify(&Notice::success("Audio deleted"));
            Ok(())
        }
        AudioSubcommand::Play { id } => print_json(&audios.increment_plays(&id).await.map_err(failed("Failed"))?),
        AudioSubcommand::Download { id } => {
            print_json(&audios.increment_downloads(&id).await.map_err(failed("Failed"))?)
        }
    }
}

async fn run_sermons(app: &App, cmd: SermonCommand) -> Result<(), CliError> {
    if !app.enter(Route::Sermons).await? {
        return Ok(());
    }
    let sermons = app.api.sermons();
    match cmd.command {
        SermonSubcommand::List { year, month, search } => {
            let mut query = SermonQuery::current_year();
            if let Some(year) = year {
                query.year = year;
            }
            query.month = month;
            let list = sermons.list(query).await.map_err(failed("Failed to load sermons"))?;
            print_json(&search_sermons(&list, &search))
        }
        SermonSubcommand::Get { id } => print_json(&sermons.get(&id).await.map_err(failed("Sermon not found"))?),
        SermonSubcommand::Create { title, date, image, pdf } => {
            let form = SermonForm {
                title,
                date,
                image: load_upload(image.as_deref()).await?,
                pdf: load_upload(pdf.as_deref()).await?,
            };
            let created = app.submissions.submit(sermons.create(&form)).await.map_err(failed("Upload failed"))?;
            notify(&Notice::success("Sermon published"));
            print_json(&created)
        }
        SermonSubcommand::Update { id, title, date } => {
            let form = SermonForm { title, date, image: None, pdf: None };
            let updated = app.submissions.submit(sermons.update(&id, &form)).await.map_err(failed("Update failed"))?;
            notify(&Notice::success("Sermon updated"));
            print_json(&updated)
        }
        SermonSubcommand::Delete { id } => {
            sermons.delete(&id).await.map_err(failed("Delete failed"))?;
            notify(&Notice::success("Sermon deleted"));
            Ok(())
        }
        SermonSubcommand::Download { id } => {
            print_json(&sermons.increment_downloads(&id).await.map_err(failed("Failed"))?)
        }
        SermonSubcommand::Stats { year } => {
            print_json(&sermons.stats(year).await.map_err(failed("Failed to load statistics"))?)
        }
    }
}

fn parse_summaries(raw: &[String]) -> Result<Vec<DailySummary>, CliError> {
    raw.iter()
        .map(|entry| {
            let (date, summary) = entry.split_once('=').ok_or_else(|| CliError::InvalidSummary(entry.clone()))?;
            Ok(DailySummary { date: date.trim().to_owned(), summary: summary.trim().to_owned() })
        })
        .collect()
}

async fn event_form(args: EventArgs) -> Result<EventForm, CliError> {
    Ok(EventForm {
        daily_summaries: parse_summaries(&args.summaries)?,
        image: load_upload(args.image.as_deref()).await?,
        title: args.title,
        description: args.description,
        start_date: args.start_date,
        end_date: args.end_date,
        location: args.location,
    })
}

async fn run_events(app: &App, cmd: EventCommand) -> Result<(), CliError> {
    if !app.enter(Route::Events).await? {
        return Ok(());
    }
    let events = app.api.events();
    match cmd.command {
        EventSubcommand::List { filter, search, page, limit } => {
            let page = events.list(page, limit).await.map_err(failed("Failed to load events"))?;
            let today = time::OffsetDateTime::now_utc().date();
            let counts = count_events(&page.items, today);
            eprintln!("{} events, {} upcoming, {} past", counts.total, counts.upcoming, counts.past);
            print_json(&filter_events(&page.items, filter, &search, today))
        }
        EventSubcommand::Get { id } => print_json(&events.get(&id).await.map_err(failed("Event not found"))?),
        EventSubcommand::Create(args) => {
            let form = event_form(args).await?;
            let created = app.submissions.submit(events.create(&form)).await.map_err(failed("Failed to create event"))?;
            notify(&Notice::success("Event created"));
            print_json(&created)
        }
        EventSubcommand::Update { id, event } => {
            let form = event_form(event).await?;
            let updated =
                app.submissions.submit(events.update(&id, &form)).await.map_err(failed("Failed to update event"))?;
            notify(&Notice::success("Event updated"));
            print_json(&updated)
        }
        EventSubcommand::Delete { id } => {
            events.delete(&id).await.map_err(failed("Delete failed"))?;
            notify(&Notice::success("Event deleted"));
            Ok(())
        }
    }
}

async fn run_posts(app: &App, cmd: PostCommand) -> Result<(), CliError> {
    if !app.enter(Route::Posts).await? {
        return Ok(());
    }
    let posts = app.api.posts();
    match cmd.command {
        PostSubcommand::List { category, page, limit } => {
            let page = posts
                .list(PostQuery { page, limit, category })
                .await
                .map_err(failed("Failed to load posts"))?;
            print_page(&page)
        }
        PostSubcommand::Get { id } => print_json(&posts.get(&id).await.map_err(failed("Post not found"))?),
        PostSubcommand::Create { content, kind, category, media } => {
            let form = PostForm { content, kind, category, media: load_upload(media.as_deref()).await? };
            let created = app.submissions.submit(posts.create(&form)).await.map_err(failed("Publication failed"))?;
            notify(&Notice::success("Post published"));
            print_json(&created)
        }
        PostSubcommand::Update { id, content, kind, category } => {
            let form = PostForm { content, kind, category, media: None };
            let updated = app.submissions.submit(posts.update(&id, &form)).await.map_err(failed("Update failed"))?;
            notify(&Notice::success("Post updated"));
            print_json(&updated)
        }
        PostSubcommand::Delete { id } => {
            posts.delete(&id).await.map_err(failed("Delete failed"))?;
            notify(&Notice::success("Post deleted"));
            Ok(())
        }
        PostSubcommand::Like { id } => print_json(&posts.like(&id).await.map_err(failed("Failed"))?),
    }
}

// =============================================================================
// ADMINISTRATION
// =============================================================================

async fn run_users(app: &App, cmd: UserCommand) -> Result<(), CliError> {
    if !app.enter(Route::Users).await? {
        return Ok(());
    }
    let users = app.api.users();
    match cmd.command {
        UserSubcommand::List { role } => {
            let list = users
                .list(UserQuery { role, ..UserQuery::default() })
                .await
                .map_err(failed("Failed to load users"))?;
            print_json(&list)
        }
        UserSubcommand::Get { id } => print_json(&users.get(&id).await.map_err(failed("User not found"))?),
        UserSubcommand::Invite { email, name, role } => {
            let form = InviteForm { email, display_name: name, role };
            let sent = app.submissions.submit(users.invite(&form)).await.map_err(failed("Invitation failed"))?;
            notify(&Notice::success(format!("Invitation sent to {}", form.email.trim())));
            print_json(&sent)
        }
        UserSubcommand::Role { id, role } => {
            users.update_role(&id, role).await.map_err(failed("Failed to update the role"))?;
            notify(&Notice::success(format!("Role changed to {}", role.label())));
            Ok(())
        }
        UserSubcommand::Resend { id } => {
            users.resend_invitation(&id).await.map_err(failed("Failed to resend the invitation"))?;
            notify(&Notice::success("Invitation resent"));
            Ok(())
        }
        UserSubcommand::Delete { id } => {
            users.delete(&id).await.map_err(failed("Delete failed"))?;
            notify(&Notice::success("User deleted"));
            Ok(())
        }
    }
}

async fn run_live(app: &App, cmd: LiveCommand) -> Result<(), CliError> {
    if !app.enter(Route::Live).await? {
        return Ok(());
    }
    let live = app.api.live();
    match cmd.command {
        LiveSubcommand::Status => print_json(&live.status().await.map_err(failed("Failed to load live status"))?),
        LiveSubcommand::Start { title, url } => {
            let form = LiveStartForm { title, youtube_url: url };
            app.submissions.submit(live.start(&form)).await.map_err(failed("Failed to start the live"))?;
            notify(&Notice::success("Live started"));
            Ok(())
        }
        LiveSubcommand::Stop => {
            live.stop().await.map_err(failed("Failed to stop the live"))?;
            notify(&Notice::success("Live stopped"));
            Ok(())
        }
        LiveSubcommand::Notify { title, body } => {
            let defaults = NotificationForm::default();
            let form = NotificationForm { title: title.unwrap_or(defaults.title), body: body.unwrap_or(defaults.body) };
            app.submissions.submit(live.notify(&form)).await.map_err(failed("Failed to send the notification"))?;
            notify(&Notice::success("Notification sent"));
            Ok(())
        }
    }
}

async fn run_donations(app: &App, cmd: DonationCommand) -> Result<(), CliError> {
    if !app.enter(Route::Donations).await? {
        return Ok(());
    }
    let donations = app.api.donations();
    match cmd.command {
        DonationSubcommand::List { filters, search } => {
            let list = donations.list(filters.query()).await.map_err(failed("Failed to load donations"))?;
            let shown = search_donations(&list, &search);
            let summary = DonationSummary::from_donations(shown.iter().copied());
            print_json(&json!({
                "donations": shown,
                "summary": {
                    "count": summary.count,
                    "total": summary.total,
                    "oneTimeTotal": summary.one_time_total,
                    "monthlyTotal": summary.monthly_total,
                    "average": summary.average,
                },
            }))
        }
        DonationSubcommand::Get { id } => print_json(&donations.get(&id).await.map_err(failed("Donation not found"))?),
        DonationSubcommand::Stats { period } => {
            print_json(&donations.stats(period).await.map_err(failed("Failed to load statistics"))?)
        }
        DonationSubcommand::Export { filters, search, output, local } => {
            let bytes = if local {
                let list = donations.list(filters.query()).await.map_err(failed("Failed to load donations"))?;
                donations_csv(search_donations(&list, &search)).into_bytes()
            } else {
                donations.export(filters.query()).await.map_err(failed("Export failed"))?
            };
            write_output(&output, &bytes)?;
            notify(&Notice::success("Export complete"));
            Ok(())
        }
    }
}

async fn run_stats(app: &App, cmd: StatsCommand) -> Result<(), CliError> {
    if !app.enter(Route::Dashboard).await? {
        return Ok(());
    }
    let stats = app.api.stats();
    let value = match cmd.command {
        StatsSubcommand::Overview => stats.overview().await,
        StatsSubcommand::Audios => stats.audios(Vec::new()).await,
        StatsSubcommand::Users => stats.users().await,
        StatsSubcommand::Engagement => stats.engagement().await,
    }
    .map_err(failed("Failed to load statistics"))?;
    print_json(&value)
}

// =============================================================================
// OUTPUT
// =============================================================================

fn notify(notice: &Notice) {
    eprintln!("{notice}");
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

fn print_page<T: Serialize>(page: &Page<T>) -> Result<(), CliError> {
    print_json(&json!({
        "items": page.items,
        "page": page.page,
        "limit": page.limit,
        "hasMore": page.has_more,
    }))
}

fn write_output(output: &str, bytes: &[u8]) -> Result<(), CliError> {
    if output == "-" {
        io::stdout().write_all(bytes)?;
        io::stdout().flush()?;
    } else {
        std::fs::write(output, bytes)?;
    }
    Ok(())
}
