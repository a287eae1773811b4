use actix_cors::Cors;
use actix_web::{App, HttpServer};

use server::handlers;
use server::server::spawn_server;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init();

    let srv_tx = spawn_server();

    HttpServer::new(move || {
        App::new()
            .wrap(
                // dev frontend origin
                Cors::default()
                    .allowed_origin("http://localhost:5173")
                    .allowed_methods(vec!["GET", "POST"]),
            )
            .data(srv_tx.clone())
            .configure(handlers::root)
    })
    .bind("127.0.0.1:3001")?
    .run()
    .await
}
