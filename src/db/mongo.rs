use mongodb::{
    options::{ClientOptions, ServerApi, ServerApiVersion},
    Client,
};
use std::sync::Arc;
use std::time::Duration;

/// Connect to MongoDB. Returns `None` on any failure so the caller can run
/// with the in-memory cache instead of refusing to start.
pub async fn create_mongo_client(uri: &str) -> Option<Arc<Client>> {
    println!("Connecting to MongoDB: {}", uri);

    let mut client_options = match ClientOptions::parse(uri).await {
        Ok(options) => options,
        Err(e) => {
            eprintln!("MongoDB URI may be incorrect! Failed to parse: {}", e);
            return None;
        }
    };

    // Set a reasonable timeout for operations
    client_options.connect_timeout = Some(Duration::from_secs(10));
    client_options.server_selection_timeout = Some(Duration::from_secs(10));
    client_options.max_pool_size = Some(10);
    client_options.min_pool_size = Some(1);

    // Set the server API if using MongoDB 5.0+
    let server_api = ServerApi::builder().version(ServerApiVersion::V1).build();
    client_options.server_api = Some(server_api);

    let client = match Client::with_options(client_options) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Failed to create MongoDB client: {}", e);
            return None;
        }
    };

    // Test the connection to make sure it works
    match client
        .database("travel_planner")
        .run_command(mongodb::bson::doc! {"ping": 1})
        .await
    {
        Ok(_) => println!("Successfully connected to MongoDB and verified with ping command"),
        Err(e) => {
            eprintln!("WARNING: Connected to MongoDB but ping test failed: {}", e);
            eprintln!("The API may still work, but some functionality might be impaired");
        }
    }

    Some(Arc::new(client))
}
