use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use consult_client::config::{ClientConfig, ConfigError};
use consult_client::error::{ApiError, InitError};
use consult_client::http::{HttpClient, Notifier};
use consult_client::router::{LOGIN_PATH, Location, Navigation, Navigator, Router};
use consult_client::services::types::{
    CodeType, ConsultOrderListParams, ConsultType, FollowType, IllnessTime, IllnessType, KnowledgeParams,
    KnowledgeType, PageParams, PartialConsult, PayParams, PaymentMethod,
};
use consult_client::services::{actions, consult, user};
use consult_client::session::{FileStorage, SessionStore};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Init(#[from] InitError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("request failed: {0}")]
    Api(#[from] ApiError),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("failed to read {path}: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("not signed in; run `consult-cli login` first")]
    NotSignedIn,
    #[error("pass --password or --code")]
    MissingCredential,
}

#[derive(Parser, Debug)]
#[command(name = "consult-cli", about = "Consult patient API CLI")]
struct Cli {
    /// Overrides `CONSULT_BASE_URL` for this invocation.
    #[arg(long, env = "CONSULT_BASE_URL")]
    base_url: Option<String>,

    #[arg(long, env = "CONSULT_SESSION_FILE")]
    session_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login(LoginArgs),
    SendCode {
        mobile: String,
        #[arg(long = "type", default_value = "login", value_parser = wire_name::<CodeType>)]
        kind: CodeType,
    },
    Logout,
    Whoami,
    Articles {
        #[arg(long = "type", default_value = "recommend", value_parser = wire_name::<KnowledgeType>)]
        kind: KnowledgeType,
        #[command(flatten)]
        page: PageArgs,
    },
    Doctors(PageArgs),
    Follow {
        id: String,
        #[arg(long = "type", default_value = "doc", value_parser = wire_name::<FollowType>)]
        kind: FollowType,
    },
    Patients,
    Departments,
    Upload {
        file: PathBuf,
    },
    Order(OrderCommand),
    /// Run a route change through the navigation guard.
    Navigate {
        path: String,
    },
}

#[derive(Args, Debug)]
struct LoginArgs {
    mobile: String,
    #[arg(long, conflicts_with = "code", required_unless_present = "code")]
    password: Option<String>,
    #[arg(long)]
    code: Option<String>,
}

#[derive(Args, Debug)]
struct PageArgs {
    #[arg(long, default_value_t = 1)]
    current: u32,
    #[arg(long, default_value_t = 10)]
    page_size: u32,
}

impl From<PageArgs> for PageParams {
    fn from(args: PageArgs) -> Self {
        Self { current: args.current, page_size: args.page_size }
    }
}

#[derive(Args, Debug)]
struct OrderCommand {
    #[command(subcommand)]
    command: OrderSubcommand,
}

#[derive(Subcommand, Debug)]
enum OrderSubcommand {
    Pre {
        #[arg(long = "type", default_value = "2", value_parser = wire_code::<ConsultType>)]
        kind: ConsultType,
        #[arg(long, default_value = "0", value_parser = wire_code::<IllnessType>)]
        illness_type: IllnessType,
    },
    Create(CreateOrderArgs),
    Pay {
        order_id: String,
        #[arg(long, default_value = "1", value_parser = wire_code::<PaymentMethod>)]
        payment_method: PaymentMethod,
        #[arg(long)]
        callback: String,
    },
    List {
        #[arg(long = "type", default_value = "2", value_parser = wire_code::<ConsultType>)]
        kind: ConsultType,
        #[command(flatten)]
        page: PageArgs,
    },
    Cancel {
        id: String,
    },
    Delete {
        id: String,
    },
    Prescription {
        id: String,
    },
    Medicine {
        id: String,
    },
}

#[derive(Args, Debug)]
struct CreateOrderArgs {
    #[arg(long = "type", default_value = "2", value_parser = wire_code::<ConsultType>)]
    kind: ConsultType,
    #[arg(long, default_value = "0", value_parser = wire_code::<IllnessType>)]
    illness_type: IllnessType,
    #[arg(long)]
    dep_id: String,
    #[arg(long)]
    desc: String,
    #[arg(long, value_parser = wire_code::<IllnessTime>)]
    illness_time: IllnessTime,
    #[arg(long, default_value_t = 0)]
    consult_flag: u8,
    #[arg(long)]
    patient_id: String,
    #[arg(long)]
    coupon_id: Option<String>,
}

/// Toasts go to stderr so stdout stays machine-readable.
struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn notify(&self, message: &str) {
        eprintln!("{message}");
    }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt::init();
    if let Err(error) = dotenvy::dotenv() {
        tracing::debug!(%error, "no .env file loaded");
    }

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let session = Arc::new(SessionStore::open(FileStorage::new(&config.session_file)));
    let router = Arc::new(Router::new(Arc::clone(&session)));
    let client = HttpClient::from_config(
        &config,
        Arc::clone(&session),
        Arc::clone(&router) as Arc<dyn Navigator>,
        Arc::new(StderrNotifier),
    )?;
    tracing::debug!(base_url = %config.base_url, session_file = %config.session_file.display(), "client ready");

    run(&client, &router, cli.command).await
}

fn load_config(cli: &Cli) -> Result<ClientConfig, CliError> {
    let base_url = cli.base_url.clone();
    let session_file = cli.session_file.as_ref().map(|p| p.display().to_string());
    let config = ClientConfig::from_lookup(|key| match key {
        "CONSULT_BASE_URL" => base_url.clone(),
        "CONSULT_SESSION_FILE" => session_file.clone(),
        _ => None,
    })?;
    Ok(config)
}

async fn run(client: &HttpClient, router: &Router, command: Command) -> Result<(), CliError> {
    match command {
        Command::Login(args) => {
            router.navigate(Location::new(LOGIN_PATH));
            let landed = match (args.password, args.code) {
                (Some(password), _) => user::sign_in_with_password(client, &args.mobile, &password).await?,
                (None, Some(code)) => user::sign_in_with_code(client, &args.mobile, &code).await?,
                (None, None) => return Err(CliError::MissingCredential),
            };
            print_json(&json!({ "landed": landed.full_path(), "title": router.title() }))
        }
        Command::SendCode { mobile, kind } => {
            user::send_mobile_code(client, &mobile, kind).await?;
            print_json(&json!({ "sent": true }))
        }
        Command::Logout => {
            user::logout(client);
            print_json(&json!({ "signedIn": false }))
        }
        Command::Whoami => {
            require_session(client)?;
            print_json(&user::get_user_info(client).await?)
        }
        Command::Articles { kind, page } => {
            let params = KnowledgeParams { kind, page: page.into() };
            print_json(&consult::get_knowledge_page(client, params).await?)
        }
        Command::Doctors(page) => print_json(&consult::get_doctor_page(client, page.into()).await?),
        Command::Follow { id, kind } => {
            consult::follow_doctor(client, &id, kind).await?;
            print_json(&json!({ "id": id, "type": kind }))
        }
        Command::Patients => print_json(&user::get_patient_list(client).await?),
        Command::Departments => print_json(&consult::get_all_dep(client).await?),
        Command::Upload { file } => {
            let bytes = tokio::fs::read(&file).await.map_err(|source| CliError::ReadFile { path: file.clone(), source })?;
            let file_name = file.file_name().map_or_else(|| "upload".to_owned(), |n| n.to_string_lossy().into_owned());
            print_json(&consult::upload_image(client, &file_name, guess_mime(&file), bytes).await?)
        }
        Command::Order(order) => run_order(client, order).await,
        Command::Navigate { path } => {
            let outcome = router.navigate(Location::parse(&path));
            print_json(&json!({
                "outcome": describe(&outcome),
                "location": router.current().full_path(),
                "title": router.title(),
            }))
        }
    }
}

async fn run_order(client: &HttpClient, order: OrderCommand) -> Result<(), CliError> {
    match order.command {
        OrderSubcommand::Pre { kind, illness_type } => {
            print_json(&consult::get_consult_order_pre(client, kind, illness_type).await?)
        }
        OrderSubcommand::Create(args) => {
            let draft = PartialConsult {
                kind: Some(args.kind),
                illness_type: Some(args.illness_type),
                dep_id: Some(args.dep_id),
                illness_desc: Some(args.desc),
                illness_time: Some(args.illness_time),
                consult_flag: Some(args.consult_flag),
                patient_id: Some(args.patient_id),
                coupon_id: args.coupon_id,
                ..PartialConsult::default()
            };
            print_json(&consult::create_consult_order(client, &draft).await?)
        }
        OrderSubcommand::Pay { order_id, payment_method, callback } => {
            let params = PayParams { payment_method, order_id, pay_callback: callback };
            print_json(&consult::get_consult_order_pay_url(client, &params).await?)
        }
        OrderSubcommand::List { kind, page } => {
            let params = ConsultOrderListParams { kind, page: page.into() };
            print_json(&consult::get_consult_order_list(client, params).await?)
        }
        OrderSubcommand::Cancel { id } => {
            consult::cancel_order(client, &id).await?;
            print_json(&json!({ "id": id, "cancelled": true }))
        }
        OrderSubcommand::Delete { id } => {
            consult::delete_order(client, &id).await?;
            print_json(&json!({ "id": id, "deleted": true }))
        }
        OrderSubcommand::Prescription { id } => {
            let url = actions::prescription_url(client, Some(&id)).await?;
            print_json(&json!({ "url": url }))
        }
        OrderSubcommand::Medicine { id } => print_json(&consult::get_medical_order_detail(client, &id).await?),
    }
}

fn require_session(client: &HttpClient) -> Result<(), CliError> {
    if client.session().is_authenticated() { Ok(()) } else { Err(CliError::NotSignedIn) }
}

fn describe(outcome: &Navigation) -> Value {
    match outcome {
        Navigation::Committed(to) => json!({ "committed": to.full_path() }),
        Navigation::Redirected { requested, to } => {
            json!({ "redirected": { "requested": requested.full_path(), "to": to.full_path() } })
        }
        Navigation::Unchanged => json!("unchanged"),
        Navigation::NotFound(path) => json!({ "notFound": path }),
    }
}

fn guess_mime(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

/// Parse a string-valued wire enum by its serialized name.
fn wire_name<T: DeserializeOwned>(raw: &str) -> Result<T, String> {
    serde_json::from_value(Value::String(raw.to_owned())).map_err(|e| e.to_string())
}

/// Parse an integer-coded wire enum by its code.
fn wire_code<T: TryFrom<u8, Error = String>>(raw: &str) -> Result<T, String> {
    let code: u8 = raw.parse().map_err(|e: std::num::ParseIntError| e.to_string())?;
    T::try_from(code)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
