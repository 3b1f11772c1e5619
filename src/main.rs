use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::PathBuf;

use oficina::api::providers::auth::{SignInData, SignUpData};
use oficina::api::{AuthProvider, Services, VehicleProvider};
use oficina::app::App;
use oficina::auth::{FormError, SessionStore, SignInForm, SignUpForm};
use oficina::checkin::Plate;
use oficina::config::Config;
use oficina::logging;

#[derive(Parser)]
#[command(name = "oficina")]
#[command(about = "Vehicle check-in for auto shops")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file path
    #[arg(short, long)]
    config: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up a vehicle and its customer by plate
    Lookup {
        /// License plate, any case
        plate: String,
    },

    /// Sign in and store the session
    Login {
        /// Account e-mail (prompted when omitted)
        #[arg(short, long)]
        email: Option<String>,
    },

    /// Create an account
    Signup {
        /// Full name
        #[arg(short, long)]
        name: Option<String>,

        /// Account e-mail
        #[arg(short, long)]
        email: Option<String>,
    },

    /// Send a password recovery e-mail
    ForgotPassword {
        email: String,
    },

    /// Sign out and remove the stored session
    Logout,

    /// Show the signed-in user
    Whoami,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first (needed for logging setup)
    let config = Config::load(cli.config.as_deref())?;

    let is_tui_mode = cli.command.is_none();

    // File-based logs for the TUI, stderr for CLI commands
    let logging_handle = logging::init_logging(&config, is_tui_mode, cli.debug)?;

    match cli.command {
        Some(Commands::Lookup { plate }) => cmd_lookup(&config, &plate).await?,
        Some(Commands::Login { email }) => cmd_login(&config, email).await?,
        Some(Commands::Signup { name, email }) => cmd_signup(&config, name, email).await?,
        Some(Commands::ForgotPassword { email }) => cmd_forgot_password(&config, &email).await?,
        Some(Commands::Logout) => cmd_logout(&config).await?,
        Some(Commands::Whoami) => cmd_whoami(&config)?,
        None => run_tui(config, logging_handle.log_file_path).await?,
    }

    Ok(())
}

async fn run_tui(config: Config, log_file_path: Option<PathBuf>) -> Result<()> {
    let mut app = App::new(config)?;
    let result = app.run().await;

    // Print log file path on exit if logs were written
    if let Some(log_path) = log_file_path {
        if let Ok(metadata) = log_path.metadata() {
            if metadata.len() > 0 {
                eprintln!("Session log: {}", log_path.display());
            }
        }
    }

    result
}

fn prompt(label: &str) -> Result<String> {
    print!("{}: ", label);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim_end_matches(['\r', '\n']).to_string())
}

fn print_form_errors(errors: &[FormError]) {
    for err in errors {
        eprintln!("  {}: {}", err.field.label(), err);
    }
}

async fn cmd_lookup(config: &Config, raw: &str) -> Result<()> {
    let plate = Plate::parse(raw)?;
    let services = Services::from_config(config)?;
    let vehicle = match services.vehicles()?.find_by_plate(&plate).await {
        Ok(vehicle) => vehicle,
        Err(err) if err.is_not_found() => {
            println!("Nenhum veículo encontrado com a placa {}", plate.as_str());
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };

    println!("Veículo {}", vehicle.plate);
    println!("{}", "─".repeat(40));
    let description = vehicle.description();
    if !description.is_empty() {
        println!("  Modelo:   {}", description);
    }
    match &vehicle.customer {
        Some(customer) => {
            println!("  Cliente:  {}", customer.name);
            if !customer.phone.is_empty() {
                println!("  Telefone: {}", customer.phone);
            }
            if !customer.email.is_empty() {
                println!("  E-mail:   {}", customer.email);
            }
            if !customer.address.is_empty() {
                println!("  Endereço: {}", customer.address);
            }
        }
        None => println!("  Cliente:  {}", vehicle.customer_id),
    }

    Ok(())
}

async fn cmd_login(config: &Config, email: Option<String>) -> Result<()> {
    let email = match email {
        Some(email) => email,
        None => prompt("E-mail")?,
    };
    let password = prompt("Senha")?;

    let data: SignInData = match (SignInForm { email, password }).validate() {
        Ok(data) => data,
        Err(errors) => {
            eprintln!("Dados inválidos:");
            print_form_errors(&errors);
            bail!("sign-in form is invalid");
        }
    };

    let services = Services::from_config(config)?;
    let session = services.auth()?.sign_in(&data).await?;
    let name = session.user.display_name();

    let mut store = SessionStore::load(config)?;
    store.set(session).context("Failed to store session")?;

    println!("Bem-vindo, {}!", name);
    Ok(())
}

async fn cmd_signup(config: &Config, name: Option<String>, email: Option<String>) -> Result<()> {
    let name = match name {
        Some(name) => name,
        None => prompt("Nome")?,
    };
    let email = match email {
        Some(email) => email,
        None => prompt("E-mail")?,
    };
    let password = prompt("Senha")?;
    let confirm_password = prompt("Confirmar senha")?;

    let form = SignUpForm {
        name,
        email,
        password,
        confirm_password,
    };
    let data: SignUpData = match form.validate() {
        Ok(data) => data,
        Err(errors) => {
            eprintln!("Dados inválidos:");
            print_form_errors(&errors);
            bail!("sign-up form is invalid");
        }
    };

    let services = Services::from_config(config)?;
    let outcome = services.auth()?.sign_up(&data).await?;

    match outcome.session {
        Some(session) => {
            let name = session.user.display_name();
            SessionStore::load(config)?
                .set(session)
                .context("Failed to store session")?;
            println!("Conta criada. Bem-vindo, {}!", name);
        }
        None => println!("Conta criada. Verifique seu e-mail para confirmar o cadastro."),
    }
    Ok(())
}

async fn cmd_forgot_password(config: &Config, email: &str) -> Result<()> {
    let services = Services::from_config(config)?;
    services.auth()?.forgot_password(email.trim()).await?;
    println!("Enviamos um link de recuperação para {}", email.trim());
    Ok(())
}

async fn cmd_logout(config: &Config) -> Result<()> {
    let mut store = SessionStore::load(config)?;
    let Some(session) = store.current().cloned() else {
        println!("Nenhuma sessão ativa");
        return Ok(());
    };

    let services = Services::from_config(config)?;
    if let Ok(auth) = services.auth() {
        if let Err(err) = auth.sign_out(&session).await {
            tracing::warn!(error = %err, "Remote sign-out failed; clearing local session");
        }
    }
    store.clear()?;

    println!("Você saiu do sistema com sucesso");
    Ok(())
}

fn cmd_whoami(config: &Config) -> Result<()> {
    let store = SessionStore::load(config)?;
    let Some(user) = store.user() else {
        println!("Nenhuma sessão ativa");
        return Ok(());
    };

    println!("{} ({})", user.display_name(), user.initials());
    if let Some(email) = &user.email {
        println!("  E-mail: {}", email);
    }
    println!("  ID:     {}", user.id);
    Ok(())
}
