use std::process::ExitCode;

use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use common::types::Route;
use common::utils::logging::init_logging;
use dotenvy::dotenv;
use models::expense::Expense;
use service::categories::CategoryResolver;
use service::expenses::view::{format_currency, range_label};
use service::expenses::ExpenseListController;
use service::onboarding::{OnboardingWizard, WizardOutcome, STEPS};
use service::runtime::AppContext;
use service::shell::{guard, Access};
use service::validation::{AuthForm, ExpenseForm};
use service::ServiceError;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "spendario", version, about = "Spendario personal finance client")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in and keep the session locally
    Login(Credentials),
    /// Create an account and sign in
    Register {
        #[command(flatten)]
        credentials: Credentials,
        #[arg(long)]
        full_name: Option<String>,
    },
    Logout,
    /// Show the signed-in user
    Whoami,
    #[command(subcommand)]
    Expenses(ExpenseCommand),
    #[command(subcommand)]
    Categories(CategoryCommand),
    #[command(subcommand)]
    Onboarding(OnboardingCommand),
}

#[derive(Args)]
struct Credentials {
    #[arg(long)]
    email: String,
    #[arg(long)]
    password: String,
}

#[derive(Subcommand)]
enum ExpenseCommand {
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    Add {
        #[arg(long)]
        amount: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        category: String,
        /// Defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long, default_value = "BRL")]
        currency: String,
    },
    Edit {
        id: String,
        /// Page the expense is listed on
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        amount: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        currency: Option<String>,
    },
    Delete {
        id: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum CategoryCommand {
    List,
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        desc: String,
    },
    /// Show which option a typed text resolves to
    Resolve { text: String },
}

#[derive(Subcommand)]
enum OnboardingCommand {
    Show,
    Country { name: String },
    Currency { code: String },
    Toggle { category: String },
    Next,
    Back,
    Finish,
    Skip,
    Save,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();
    let cli = Cli::parse();

    let config = match configs::AppConfig::load_and_validate() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("config error: {e:#}");
            return ExitCode::from(2);
        }
    };
    init_logging(&config.logging.format);
    info!(service = "spendario", event = "start", version = env!("CARGO_PKG_VERSION"), api = %config.api.base_url);

    match run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(service = "spendario", event = "command_failed", error = %e);
            report(&e);
            ExitCode::FAILURE
        }
    }
}

fn report(e: &anyhow::Error) {
    match e.downcast_ref::<ServiceError>() {
        Some(ServiceError::Validation(errors)) => {
            for (field, message) in errors.iter() {
                eprintln!("{}: {}", field.as_str(), message);
            }
        }
        Some(service_error) => eprintln!("{}", service_error.user_message()),
        None => eprintln!("{e:#}"),
    }
}

async fn run(cli: Cli, config: configs::AppConfig) -> anyhow::Result<()> {
    let ctx = AppContext::bootstrap(config).await?;
    match cli.command {
        Command::Login(credentials) => authenticate(&ctx, credentials, None).await,
        Command::Register { credentials, full_name } => {
            authenticate(&ctx, credentials, Some(full_name.unwrap_or_default())).await
        }
        Command::Logout => {
            ctx.auth().logout().await?;
            println!("Sessão encerrada.");
            Ok(())
        }
        Command::Whoami => {
            match ctx.sessions.current().await {
                Some(session) => println!("{} <{}>", session.user.display_name(), session.user.email),
                None => println!("Nenhuma sessão ativa."),
            }
            Ok(())
        }
        Command::Expenses(cmd) => {
            require(&ctx, Route::Expenses).await?;
            expenses(&ctx, cmd).await
        }
        Command::Categories(cmd) => {
            require(&ctx, Route::Categories).await?;
            categories(&ctx, cmd).await
        }
        Command::Onboarding(cmd) => {
            require(&ctx, Route::Onboarding).await?;
            onboarding(&ctx, cmd).await
        }
    }
}

async fn require(ctx: &AppContext, route: Route) -> anyhow::Result<()> {
    match guard(route, &ctx.sessions).await {
        Access::Public | Access::Granted(_) => Ok(()),
        Access::Redirect(to) => Err(ServiceError::Unauthorized(format!("Faça login para continuar ({to}).")).into()),
    }
}

async fn authenticate(ctx: &AppContext, credentials: Credentials, full_name: Option<String>) -> anyhow::Result<()> {
    let auth = ctx.auth();
    let registering = full_name.is_some();
    let form = AuthForm { email: credentials.email, password: credentials.password, full_name: full_name.unwrap_or_default() };
    let outcome = if registering { auth.register(&form).await? } else { auth.login(&form).await? };
    println!("{}", outcome.message);
    println!("Olá, {}!", outcome.session.user.display_name());
    Ok(())
}

fn print_expense(expense: &Expense, resolver: &CategoryResolver) {
    println!(
        "{:<12} {} {:>14} {:<14} {}",
        expense.id,
        expense.transaction_date,
        format_currency(&expense.amount, &expense.currency),
        resolver.label_for(expense.category_id).unwrap_or("?"),
        expense.description,
    );
}

fn print_page<A: service::api::ExpenseApi>(list: &ExpenseListController<A>) {
    if list.is_empty() {
        println!("{}", service::expenses::view::EMPTY_LIST);
        return;
    }
    for expense in list.items() {
        print_expense(expense, list.resolver());
    }
    let pagination = list.pagination();
    println!("{} · {}", range_label(&pagination), pagination.label());
}

async fn expenses(ctx: &AppContext, cmd: ExpenseCommand) -> anyhow::Result<()> {
    let mut list = ctx.expenses().await;
    match cmd {
        ExpenseCommand::List { page } => {
            list.fetch_page(page).await?;
            print_page(&list);
        }
        ExpenseCommand::Add { amount, description, category, date, currency } => {
            let mut form = ExpenseForm::new(Local::now().date_naive());
            form.amount = amount;
            form.description = description;
            form.category_input = category;
            form.currency = currency;
            if date.is_some() {
                form.date = date;
            }
            let created = list.create(&mut form).await?;
            print_expense(&created, list.resolver());
            if let Some(message) = list.form_message() {
                println!("{message}");
            }
        }
        ExpenseCommand::Edit { id, page, amount, description, category, date, currency } => {
            list.fetch_page(page).await?;
            list.begin_edit(&id)?;
            if let Some(form) = list.edit_form_mut() {
                if let Some(amount) = amount { form.amount = amount; }
                if let Some(description) = description { form.description = description; }
                if let Some(category) = category { form.category_input = category; }
                if let Some(currency) = currency { form.currency = currency; }
                if date.is_some() { form.date = date; }
            }
            let updated = list.submit_edit().await?;
            print_expense(&updated, list.resolver());
            if let Some(message) = list.list_message() {
                eprintln!("{message}");
            }
        }
        ExpenseCommand::Delete { id, page, yes } => {
            list.fetch_page(page).await?;
            list.request_delete(&id)?;
            if !yes && !confirm(&format!("Excluir {id}? [s/N] ")).await? {
                list.cancel_delete();
                println!("Exclusão cancelada.");
                return Ok(());
            }
            list.confirm_delete().await?;
            println!("Despesa excluída.");
            print_page(&list);
        }
    }
    Ok(())
}

async fn confirm(prompt: &str) -> anyhow::Result<bool> {
    eprint!("{prompt}");
    let mut line = String::new();
    BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
    Ok(matches!(line.trim().to_lowercase().as_str(), "s" | "sim" | "y" | "yes"))
}

async fn categories(ctx: &AppContext, cmd: CategoryCommand) -> anyhow::Result<()> {
    let mut catalog = ctx.catalog().await;
    match cmd {
        CategoryCommand::List => {
            for category in catalog.list() {
                println!("{:>3}  {:<20} {}", category.id, category.name, category.desc);
            }
        }
        CategoryCommand::Add { name, desc } => {
            let created = catalog.create(&name, &desc).await?;
            println!("Categoria {} criada: {}", created.id, created.name);
        }
        CategoryCommand::Resolve { text } => match catalog.resolver().await.resolve(&text) {
            Some(option) => println!("{} {} (id {})", option.icon, option.label, option.id),
            None => println!("{}", service::validation::CATEGORY_UNKNOWN),
        },
    }
    Ok(())
}

fn print_wizard(wizard: &OnboardingWizard) {
    let state = wizard.state();
    let (title, description) = STEPS[usize::from(state.step.clamp(1, 2)) - 1];
    println!("Passo {} de 2: {title}", state.step);
    println!("{description}");
    let currency = models::onboarding::currency_name(&state.currency).unwrap_or("");
    println!("País: {}  Moeda: {} {}", state.country, state.currency, currency);
    println!("Categorias: {}", state.categories.join(", "));
    println!("Status: {:?}", state.status);
}

fn print_outcome(outcome: &WizardOutcome) {
    if let Some(message) = outcome.message {
        println!("{message}");
    }
    if let Some(route) = outcome.navigate_to {
        println!("→ {route}");
    }
}

async fn onboarding(ctx: &AppContext, cmd: OnboardingCommand) -> anyhow::Result<()> {
    let mut wizard = ctx.onboarding().await?;
    let outcome = match cmd {
        OnboardingCommand::Show => None,
        OnboardingCommand::Country { name } => {
            wizard.set_country(&name).await?;
            None
        }
        OnboardingCommand::Currency { code } => {
            wizard.set_currency(&code).await?;
            None
        }
        OnboardingCommand::Toggle { category } => {
            let selected = wizard.toggle_category(&category).await?;
            println!("{category}: {}", if selected { "selecionada" } else { "removida" });
            None
        }
        OnboardingCommand::Next => Some(wizard.next().await?),
        OnboardingCommand::Back => Some(wizard.back().await?),
        OnboardingCommand::Finish => Some(wizard.finish().await?),
        OnboardingCommand::Skip => Some(wizard.skip().await?),
        OnboardingCommand::Save => Some(wizard.save_for_later().await?),
    };
    print_wizard(&wizard);
    if let Some(outcome) = outcome {
        print_outcome(&outcome);
    }
    Ok(())
}
