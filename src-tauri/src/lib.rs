pub mod commands;
mod error;
pub mod generator;
pub mod session;

pub use error::TryOnError;
pub use session::{PipelineStage, QualityMode, RunOutcome, SessionSnapshot, TryOnController};

pub fn run() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tauri::Builder::default()
        .plugin(tauri_plugin_store::Builder::new().build())
        .manage(commands::session::SessionState::new())
        .invoke_handler(tauri::generate_handler![
            commands::keychain::set_api_key,
            commands::keychain::get_api_key,
            commands::keychain::delete_api_key,
            commands::config::get_preference,
            commands::config::set_preference,
            commands::health::run_health_check,
            commands::models::list_models,
            commands::session::upload_person_image,
            commands::session::upload_cloth_image,
            commands::session::clear_person_image,
            commands::session::clear_cloth_image,
            commands::session::set_quality_mode,
            commands::session::start_try_on,
            commands::session::get_session,
            commands::session::reset_session,
            commands::session::acknowledge_error,
        ])
        .setup(|app| {
            // Restore the last-used quality mode from preferences
            use tauri::Manager;
            use tauri_plugin_store::StoreExt;
            if let Ok(store) = app.store("preferences.json") {
                if let Some(saved) = store
                    .get("default_quality")
                    .and_then(|v| v.as_str().map(|s| s.to_string()))
                {
                    let state = app.state::<commands::session::SessionState>();
                    state.0.set_quality(QualityMode::from_preference(&saved));
                }
            }
            Ok(())
        })
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
