use log::error;
use trending_backend::build_rocket;
use trending_backend::config::{create_app_state, create_cors, init_logger, load_environment};

#[rocket::launch]
async fn rocket() -> _ {
    load_environment();
    init_logger();

    let app_state = match create_app_state().await {
        Ok(state) => state,
        Err(e) => {
            error!("Failed to initialize application state: {e:?}");
            std::process::exit(1);
        }
    };

    let cors = match create_cors() {
        Ok(cors) => cors,
        Err(e) => {
            error!("Failed to create CORS fairing: {e:?}");
            std::process::exit(1);
        }
    };

    build_rocket(app_state).attach(cors)
}
