use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use session_core::{
    config::{load_settings, load_settings_file, LatencySettings, SessionSettings},
    error::{classify_failure, FormContext},
    gate::{render_target, RenderTarget},
    validation, SessionController, SessionError, SessionSnapshot, SimulatedBackend, SocialProvider,
    TracingNavigator,
};

#[derive(Parser, Debug)]
#[command(name = "session-cli", about = "Drive the PatternScanner session flows")]
struct Args {
    /// Settings file; defaults to ./session.toml when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Skip the simulated network latency.
    #[arg(long, global = true)]
    instant: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    SignIn {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    SignUp {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// Complete profile setup with this username right after signing up.
        #[arg(long)]
        username: Option<String>,
        #[arg(long, requires = "username")]
        profile_image: Option<String>,
    },
    SocialSignIn {
        #[arg(long, value_enum)]
        provider: Provider,
    },
    PhoneSignUp {
        #[arg(long)]
        phone: String,
        #[arg(long)]
        code: String,
    },
    ResetPassword {
        #[arg(long)]
        email: String,
    },
    /// Startup, email sign-up, profile completion, sign-out.
    Walkthrough {
        #[arg(long, default_value = "a@b.com")]
        email: String,
        #[arg(long, default_value = "alice")]
        username: String,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Provider {
    Google,
    Apple,
}

impl From<Provider> for SocialProvider {
    fn from(provider: Provider) -> Self {
        match provider {
            Provider::Google => SocialProvider::Google,
            Provider::Apple => SocialProvider::Apple,
        }
    }
}

#[derive(Serialize)]
struct Report<'a> {
    step: &'a str,
    render_target: RenderTarget,
    session: &'a SessionSnapshot,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let args = Args::parse();

    let settings = resolve_settings(&args)?;
    let backend = Arc::new(SimulatedBackend::new(settings.latency));
    let controller = SessionController::new_with_navigator(backend, Arc::new(TracingNavigator));

    report(&controller, "startup")?;
    controller.initialize().await?;
    report(&controller, "initialized")?;

    match args.command {
        Command::SignIn { email, password } => {
            check_sign_in_form(&email, &password)?;
            submit(FormContext::SignIn, controller.sign_in(&email, &password).await)?;
            report(&controller, "signed_in")?;
        }
        Command::SignUp {
            email,
            password,
            username,
            profile_image,
        } => {
            check_sign_up_form(&email, &password)?;
            submit(FormContext::SignUp, controller.sign_up(&email, &password).await)?;
            report(&controller, "signed_up")?;
            if let Some(username) = username {
                check_username(&username)?;
                submit(
                    FormContext::ProfileSetup,
                    controller.update_profile(&username, profile_image).await,
                )?;
                report(&controller, "profile_completed")?;
            }
        }
        Command::SocialSignIn { provider } => {
            let provider = SocialProvider::from(provider);
            submit(
                FormContext::SocialSignIn(provider),
                controller.sign_in_with_provider(provider).await,
            )?;
            report(&controller, "signed_in")?;
        }
        Command::PhoneSignUp { phone, code } => {
            submit(
                FormContext::PhoneVerification,
                controller.send_phone_verification(&phone).await,
            )?;
            println!(
                "Verification code sent to {}",
                validation::format_phone_number(&phone)
            );
            submit(
                FormContext::PhoneVerification,
                controller.verify_phone_and_sign_up(&phone, &code).await,
            )?;
            report(&controller, "phone_signed_up")?;
        }
        Command::ResetPassword { email } => {
            submit(
                FormContext::PasswordReset,
                controller.request_password_reset(&email).await,
            )?;
            println!("We've sent a password reset link to {email}");
        }
        Command::Walkthrough { email, username } => {
            submit(FormContext::SignUp, controller.sign_up(&email, "pw").await)?;
            report(&controller, "signed_up")?;
            submit(
                FormContext::ProfileSetup,
                controller.update_profile(&username, None).await,
            )?;
            report(&controller, "profile_completed")?;
            controller.sign_out().await;
            report(&controller, "signed_out")?;
        }
    }

    Ok(())
}

fn resolve_settings(args: &Args) -> Result<SessionSettings> {
    let mut settings = match &args.config {
        Some(path) => load_settings_file(path)?,
        None => load_settings()?,
    };
    if args.instant {
        settings.latency = LatencySettings::instant();
    }
    Ok(settings)
}

fn check_sign_in_form(email: &str, password: &str) -> Result<()> {
    if !validation::is_valid_email(email) {
        bail!("Please enter a valid email address");
    }
    if !validation::is_valid_login_password(password) {
        bail!("Password must be at least 6 characters");
    }
    Ok(())
}

fn check_sign_up_form(email: &str, password: &str) -> Result<()> {
    if !validation::is_valid_email(email) {
        bail!("Please enter a valid email address");
    }
    if !validation::is_valid_signup_password(password) {
        bail!("Password must be at least 8 characters");
    }
    Ok(())
}

fn check_username(username: &str) -> Result<()> {
    if !validation::is_valid_username(username) {
        bail!("Username must be at least 3 characters and contain only letters, numbers, and underscores");
    }
    Ok(())
}

fn submit(context: FormContext, outcome: Result<(), SessionError>) -> Result<()> {
    match outcome {
        Ok(()) => Ok(()),
        Err(err) => {
            tracing::error!(error = %err, ?context, "session request failed");
            bail!(classify_failure(context, &err))
        }
    }
}

fn report(controller: &SessionController, step: &str) -> Result<()> {
    let session = controller.snapshot();
    let report = Report {
        step,
        render_target: render_target(&session),
        session: &session,
    };
    println!("{}", serde_json::to_string(&report)?);
    Ok(())
}
