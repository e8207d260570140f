//! Opens a session against the records API and prints the dashboard and the
//! first page of each list.

use std::env;
use std::num::NonZeroUsize;
use std::sync::Arc;

use config::Config;
use dotenvy::dotenv;

use mejcrt_client::api::http::HttpApi;
use mejcrt_client::dto::ListView;
use mejcrt_client::models::config::ClientConfig;
use mejcrt_client::routes::Navigation;
use mejcrt_client::services::dashboard::load_dashboard;
use mejcrt_client::services::patients::mount_patient_list;
use mejcrt_client::services::transfusions::mount_transfusion_list;
use mejcrt_client::session::Session;

fn page_size(value: usize, name: &str) -> NonZeroUsize {
    NonZeroUsize::new(value).unwrap_or_else(|| {
        log::warn!("{name} must be positive, using 1");
        NonZeroUsize::MIN
    })
}

#[tokio::main]
async fn main() {
    dotenv().ok(); // Load .env file
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    // Select config profile (defaults to `local`).
    let app_env = env::var("APP_ENV").unwrap_or_else(|_| "local".into());

    let settings = Config::builder()
        .add_source(config::File::with_name("config/default"))
        .add_source(config::File::with_name(&format!("config/{app_env}")).required(false))
        .add_source(config::Environment::with_prefix("APP"))
        .build();

    let settings = match settings {
        Ok(settings) => settings,
        Err(err) => {
            log::error!("Error loading settings: {err}");
            std::process::exit(1);
        }
    };

    let client_config = match settings.try_deserialize::<ClientConfig>() {
        Ok(client_config) => client_config,
        Err(err) => {
            log::error!("Error loading client config: {err}");
            std::process::exit(1);
        }
    };

    let api = match HttpApi::new(&client_config) {
        Ok(api) => Arc::new(api),
        Err(err) => {
            log::error!("Failed to build HTTP client: {err}");
            std::process::exit(1);
        }
    };

    let session = Session::establish(api.as_ref(), client_config.continue_origin()).await;
    let snapshot = session.snapshot();
    match &snapshot.user {
        Some(user) => log::info!("Logged in as {}", user.display_name()),
        None => {
            log::warn!(
                "Not logged in; sign in at {}",
                snapshot.login_url.as_deref().unwrap_or("<unavailable>")
            );
            return;
        }
    }

    match load_dashboard(api.as_ref(), &session).await {
        Ok(Navigation::Render(data)) => {
            let patients = data.patients.map_or(0, |s| s.all);
            let transfusions = data.transfusions.map_or(0, |s| s.all);
            log::info!("{patients} patients, {transfusions} transfusions");
            if let Some(percent) = data.no_reaction_percent {
                log::info!("{percent:.1}% of transfusions without reaction");
            }
        }
        Ok(Navigation::Redirect(route)) => log::warn!("Dashboard redirected to {route}"),
        Err(err) => log::error!("Failed to load dashboard: {err}"),
    }

    let patient_page = page_size(client_config.patient_page_size, "patient_page_size");
    if let Ok(Navigation::Render(browser)) =
        mount_patient_list(api.clone(), &session, patient_page).await
    {
        let view = ListView::from(&browser.state());
        log::info!("Patients, page {} of {} records:", view.page, view.count);
        for patient in &view.items {
            log::info!("  {}", patient.display_text());
        }
    }

    let transfusion_page = page_size(client_config.transfusion_page_size, "transfusion_page_size");
    if let Ok(Navigation::Render(browser)) =
        mount_transfusion_list(api.clone(), &session, transfusion_page).await
    {
        let view = ListView::from(&browser.state());
        log::info!("Transfusions, page {} of {} records:", view.page, view.count);
        for transfusion in &view.items {
            log::info!("  {} | {}", transfusion.code, transfusion.patient.name);
        }
    }

    if let Some(notification) = session.take_notification() {
        log::warn!("{}", notification.message);
    }
}
