use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use country_atlas::config::AtlasConfig;
use country_atlas::filter::{region_options, CountryFilter};
use country_atlas::model::DataTable;
use country_atlas::render;
use country_atlas::routes::Route;
use country_atlas::row::TestRow;
use country_atlas::Atlas;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

/// Browse countries, capital weather and backend test tables
#[derive(Parser)]
#[command(name = "country-atlas", version)]
struct Opts {
    #[command(flatten)]
    connection: Connection,

    #[command(flatten)]
    credentials: Credentials,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct Connection {
    /// Backend project URL
    #[arg(long, env = "SUPABASE_URL")]
    supabase_url: String,

    /// Backend anonymous key
    #[arg(long, env = "SUPABASE_ANON_KEY", hide_env_values = true)]
    anon_key: String,

    #[arg(long, env = "COUNTRIES_API_URL")]
    countries_url: Option<String>,

    #[arg(long, env = "WEATHER_API_URL")]
    weather_url: Option<String>,

    #[arg(long, env = "WEATHER_API_KEY", hide_env_values = true)]
    weather_api_key: Option<String>,

    #[arg(long, env = "WEATHER_UNITS", default_value = "metric")]
    weather_units: String,

    /// Per-request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,
}

#[derive(Args)]
struct Credentials {
    #[arg(long, env = "ATLAS_EMAIL")]
    email: Option<String>,

    #[arg(long, env = "ATLAS_PASSWORD", hide_env_values = true)]
    password: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// List countries
    Countries {
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long, default_value = "")]
        region: String,
    },
    /// List the regions present in the collection
    Regions,
    /// Show one country and the weather in its capital
    Country { name: String },
    /// Show a test table
    Rows {
        #[arg(long)]
        protected: bool,
    },
    /// Create a row from column=value pairs
    Insert {
        #[arg(long)]
        protected: bool,
        #[arg(required = true)]
        values: Vec<String>,
    },
    /// Render the view a client route lands on
    Open { path: String },
}

impl Connection {
    fn config(&self) -> anyhow::Result<AtlasConfig> {
        let mut config = AtlasConfig::new(&self.supabase_url, self.anon_key.as_str())?
            .with_weather_api_key(self.weather_api_key.clone())
            .with_weather_units(&self.weather_units)
            .with_request_timeout(self.timeout.map(Duration::from_secs));
        if let Some(url) = &self.countries_url {
            config = config.with_countries_url(url)?;
        }
        if let Some(url) = &self.weather_url {
            config = config.with_weather_url(url)?;
        }
        Ok(config)
    }
}

fn table_of(protected: bool) -> DataTable {
    if protected {
        DataTable::Protected
    } else {
        DataTable::Public
    }
}

/// Sign in when credentials were given; without them protected data is refused
async fn sign_in(atlas: &Atlas, credentials: &Credentials) -> anyhow::Result<()> {
    let (Some(email), Some(password)) = (&credentials.email, &credentials.password) else {
        warn!("no credentials given, protected data will be refused");
        return Ok(());
    };
    atlas
        .sign_in(email, password)
        .await
        .with_context(|| format!("sign in as {}", email))?;
    Ok(())
}

async fn show_rows(atlas: &Atlas, table: DataTable) -> String {
    let state = atlas.rows(table).ensure_loaded().await;
    render::rows_section(table, &state)
}

async fn show_route(atlas: &Atlas, route: Route) -> String {
    let body = match &route {
        Route::Home => "Country Atlas\n".to_string(),
        Route::Login => "Sign in with --email and --password.\n".to_string(),
        Route::TestData => show_rows(atlas, DataTable::Public).await,
        Route::Protected => show_rows(atlas, DataTable::Protected).await,
        Route::Countries => {
            let state = atlas.countries().ensure_loaded().await;
            render::country_list(&state, &CountryFilter::default())
        }
        Route::Country(segment) => render::country_detail(&atlas.country_detail(segment).await),
    };
    format!("{}\n\n{}", render::navigation(&atlas.navigation()), body)
}

async fn run(opts: Opts) -> anyhow::Result<()> {
    let atlas = Atlas::new(opts.connection.config()?).context("create client")?;

    let needs_session = match &opts.command {
        Command::Rows { protected } | Command::Insert { protected, .. } => *protected,
        Command::Open { path } => Route::parse(path).is_some_and(|r| r.requires_session()),
        _ => false,
    };
    if needs_session {
        sign_in(&atlas, &opts.credentials).await?;
    }

    let result = execute(&atlas, opts.command).await;
    if atlas.session().is_some() {
        atlas.sign_out().await;
    }
    result
}

async fn execute(atlas: &Atlas, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Countries { search, region } => {
            let state = atlas.countries().ensure_loaded().await;
            print!("{}", render::country_list(&state, &CountryFilter::new(search, region)));
        }
        Command::Regions => {
            let state = atlas.countries().ensure_loaded().await;
            if let Some(error) = state.error {
                bail!(error);
            }
            for region in region_options(&state.items) {
                println!("{}", region);
            }
        }
        Command::Country { name } => {
            let detail = atlas.country_detail(&name).await;
            print!("{}", render::country_detail(&detail));
        }
        Command::Rows { protected } => {
            print!("{}", show_rows(atlas, table_of(protected)).await);
        }
        Command::Insert { protected, values } => {
            let table = table_of(protected);
            let row = TestRow::from_pairs(&values)?;
            atlas
                .submit_row(table, &row)
                .await
                .with_context(|| format!("insert into {}", table.name()))?;
            print!("{}", render::rows_section(table, &atlas.rows(table).snapshot()));
        }
        Command::Open { path } => {
            let Some(route) = atlas.open(&path) else {
                bail!("no route for {}", path);
            };
            print!("{}", show_route(atlas, route).await);
        }
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    dotenv::dotenv().ok();
    let opts = Opts::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(opts).await {
        error!(error = ?e, "command failed");
        std::process::exit(1);
    }
}
