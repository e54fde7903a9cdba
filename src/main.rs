#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    rental_docs_server::run().await?;
    Ok(())
}
