use anyhow::Result;
use folio_server::ApiServer;
use folio_storage::Storage;
use std::sync::Arc;

pub async fn handle(storage: &Storage, host: String, port: u16, read_only: bool) -> Result<()> {
    // Storage clones share the pool and owner locks
    let db = Arc::new(storage.clone());

    println!("Starting folio API on {}:{}", host, port);
    ApiServer::serve(db, &host, port, read_only).await?;

    Ok(())
}
