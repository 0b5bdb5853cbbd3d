// nc_loader/src/mongo/mod.rs
// MongoDB connection bootstrap and the collection sink used for bulk inserts.

use async_trait::async_trait;
use mongodb::bson::{Document, doc};
use mongodb::error::ErrorKind;
use mongodb::options::{ClientOptions, InsertManyOptions};
use mongodb::{Client, Collection, Database};
use tracing::info;

use crate::error::{LoaderError, Result};
use crate::registry::CollectionRegistry;
use crate::retry::{execute_with_retry, wrap_error};
use crate::sink::DocumentSink;

/// A connected client bound to one database.
#[derive(Clone, Debug,)]
pub struct MongoConnector {
    database: Database,
}

impl MongoConnector {
    pub async fn connect(uri: &str, database_name: &str,) -> Result<Self,> {
        let mut client_options = ClientOptions::parse(uri,).await.map_err(|e| {
            LoaderError::ConfigurationError(format!("Failed to parse MongoDB URI: {}", e),)
        },)?;
        client_options
            .app_name
            .get_or_insert_with(|| env!("CARGO_PKG_NAME").to_string(),);
        let client = Client::with_options(client_options,).map_err(|e| {
            LoaderError::ConnectionError(format!("Failed to create MongoDB client: {}", e),)
        },)?;

        execute_with_retry(|| async {
            client
                .database("admin",)
                .run_command(doc! {"ping": 1}, None,)
                .await
                .map(|_| (),)
                .map_err(|e| {
                    wrap_error(LoaderError::ConnectionError(format!(
                        "Failed to connect to MongoDB: {}",
                        e
                    ),),)
                },)
        },)
        .await?;

        info!("Connected to MongoDB database '{}'", database_name);
        let database = client.database(database_name,);
        Ok(MongoConnector { database, },)
    }

    pub fn sink(&self, collection_name: &str,) -> MongoSink {
        MongoSink {
            collection: self.database.collection::<Document>(collection_name,),
        }
    }

    /// Registers every `name -> path` mapping against a collection of the same name.
    pub fn registry<'a, I,>(&self, mappings: I,) -> Result<CollectionRegistry<MongoSink,>,>
    where
        I: IntoIterator<Item = (&'a String, &'a std::path::PathBuf,),>,
    {
        CollectionRegistry::from_entries(
            mappings
                .into_iter()
                .map(|(name, path,)| (name.clone(), self.sink(name,), path.clone(),),),
        )
    }
}

#[derive(Clone, Debug,)]
pub struct MongoSink {
    collection: Collection<Document,>,
}

impl MongoSink {
    pub fn collection(&self,) -> &Collection<Document,> {
        &self.collection
    }
}

#[async_trait]
impl DocumentSink for MongoSink {
    fn name(&self,) -> &str {
        self.collection.name()
    }

    async fn insert_unordered(&self, documents: Vec<Document,>,) -> Result<u64,> {
        let attempted = documents.len();
        if attempted == 0 {
            return Ok(0,);
        }
        let options = InsertManyOptions::builder().ordered(false,).build();

        match self.collection.insert_many(documents, options,).await {
            Ok(result,) => Ok(result.inserted_ids.len() as u64,),
            Err(e,) => {
                let failed = match e.kind.as_ref() {
                    ErrorKind::BulkWrite(failure,) => failure
                        .write_errors
                        .as_ref()
                        .map_or(attempted, Vec::len,),
                    _ => attempted,
                };
                Err(LoaderError::WriteError {
                    collection: self.name().to_string(),
                    attempted,
                    failed,
                    cause: e.to_string(),
                },)
            },
        }
    }

    async fn clear(&self,) -> Result<(),> {
        self.collection
            .drop(None,)
            .await
            .map_err(|e| LoaderError::ClearError {
                collection: self.name().to_string(),
                cause:      e.to_string(),
            },)
    }
}
