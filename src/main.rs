use std::process::ExitCode;

#[actix_web::main]
async fn main() -> ExitCode {
    match county_health_lib::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "Service stopped");
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}
