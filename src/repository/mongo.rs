//! MongoDB-backed books repository

use std::time::Duration;

use async_trait::async_trait;
use bson::{doc, oid::ObjectId, DateTime as BsonDateTime, Document};
use mongodb::{
    options::{ClientOptions, Credential, FindOneAndUpdateOptions, FindOptions, ReturnDocument},
    Client, Collection, Database,
};
use serde::{Deserialize, Serialize};
use tokio_stream::StreamExt;

use super::{book_not_found, BooksRepository};
use crate::{
    config::DatabaseConfig,
    error::AppResult,
    models::{Book, BookChanges, BookId, NewBook, Pagination},
};

/// Stored shape of a book document
#[derive(Debug, Clone, Serialize, Deserialize)]
struct BookDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    titulo: String,
    autor: String,
    editora: String,
    ano: i32,
    preco: f64,
    #[serde(rename = "createdAt")]
    created_at: BsonDateTime,
    #[serde(rename = "updatedAt")]
    updated_at: BsonDateTime,
}

impl From<BookDocument> for Book {
    fn from(doc: BookDocument) -> Self {
        Book {
            id: doc.id.to_hex(),
            title: doc.titulo,
            author: doc.autor,
            publisher: doc.editora,
            year: doc.ano,
            price: doc.preco,
            created_at: doc.created_at.to_chrono(),
            updated_at: doc.updated_at.to_chrono(),
        }
    }
}

/// Build the `$set` document for an update; `updatedAt` is always refreshed
fn set_document(changes: BookChanges, now: BsonDateTime) -> Document {
    let mut set = doc! { "updatedAt": now };
    if let Some(title) = changes.title {
        set.insert("titulo", title);
    }
    if let Some(author) = changes.author {
        set.insert("autor", author);
    }
    if let Some(publisher) = changes.publisher {
        set.insert("editora", publisher);
    }
    if let Some(year) = changes.year {
        set.insert("ano", year);
    }
    if let Some(price) = changes.price {
        set.insert("preco", price);
    }
    set
}

/// Newest first; `_id` breaks ties between books created in the same millisecond
fn page_sort() -> Document {
    doc! { "createdAt": -1, "_id": -1 }
}

/// Open a client and confirm the deployment answers a `ping`.
///
/// The driver connects lazily, so the ping is what surfaces bad hosts or credentials.
pub async fn connect(config: &DatabaseConfig) -> Result<Client, mongodb::error::Error> {
    let mut options = ClientOptions::parse(format!("{}://{}/", config.scheme, config.host)).await?;
    options.app_name = Some(env!("CARGO_PKG_NAME").to_string());
    options.connect_timeout = Some(Duration::from_secs(config.connect_timeout_secs));
    options.server_selection_timeout = Some(Duration::from_secs(config.connect_timeout_secs));
    options.credential = Some(
        Credential::builder()
            .username(config.user.clone())
            .password(config.password.clone())
            .build(),
    );

    let client = Client::with_options(options)?;
    client
        .database(&config.name)
        .run_command(doc! { "ping": 1 }, None)
        .await?;

    Ok(client)
}

#[derive(Clone)]
pub struct MongoBooksRepository {
    database: Database,
    collection: Collection<BookDocument>,
}

impl MongoBooksRepository {
    pub fn new(client: &Client, config: &DatabaseConfig) -> Self {
        let database = client.database(&config.name);
        let collection = database.collection::<BookDocument>(&config.collection);
        Self {
            database,
            collection,
        }
    }
}

#[async_trait]
impl BooksRepository for MongoBooksRepository {
    async fn insert(&self, book: NewBook) -> AppResult<Book> {
        let now = BsonDateTime::now();
        let doc = BookDocument {
            id: ObjectId::new(),
            titulo: book.title,
            autor: book.author,
            editora: book.publisher,
            ano: book.year,
            preco: book.price,
            created_at: now,
            updated_at: now,
        };

        self.collection.insert_one(&doc, None).await?;
        tracing::debug!("Inserted book {}", doc.id);
        Ok(doc.into())
    }

    async fn find_page(&self, pagination: Pagination) -> AppResult<Vec<Book>> {
        let options = FindOptions::builder()
            .sort(page_sort())
            .skip(pagination.offset())
            .limit(pagination.limit as i64)
            .build();

        let cursor = self.collection.find(doc! {}, options).await?;
        let docs: Vec<BookDocument> = cursor.collect::<Result<Vec<_>, _>>().await?;
        Ok(docs.into_iter().map(Book::from).collect())
    }

    async fn count(&self) -> AppResult<u64> {
        Ok(self.collection.count_documents(doc! {}, None).await?)
    }

    async fn get_by_id(&self, id: &BookId) -> AppResult<Book> {
        self.collection
            .find_one(doc! { "_id": id.object_id() }, None)
            .await?
            .map(Book::from)
            .ok_or_else(book_not_found)
    }

    async fn update(&self, id: &BookId, changes: BookChanges) -> AppResult<Book> {
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        self.collection
            .find_one_and_update(
                doc! { "_id": id.object_id() },
                doc! { "$set": set_document(changes, BsonDateTime::now()) },
                options,
            )
            .await?
            .map(Book::from)
            .ok_or_else(book_not_found)
    }

    async fn delete(&self, id: &BookId) -> AppResult<Book> {
        self.collection
            .find_one_and_delete(doc! { "_id": id.object_id() }, None)
            .await?
            .map(Book::from)
            .ok_or_else(book_not_found)
    }

    async fn ping(&self) -> AppResult<()> {
        self.database.run_command(doc! { "ping": 1 }, None).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_document_only_supplied_fields() {
        let now = BsonDateTime::now();
        let set = set_document(
            BookChanges {
                price: Some(12.5),
                ..Default::default()
            },
            now,
        );
        assert_eq!(set, doc! { "updatedAt": now, "preco": 12.5 });
    }

    #[test]
    fn test_page_sort_breaks_ties_by_id() {
        let sort = page_sort();
        let keys: Vec<&str> = sort.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["createdAt", "_id"]);
        assert_eq!(sort.get_i32("createdAt").unwrap(), -1);
        assert_eq!(sort.get_i32("_id").unwrap(), -1);
    }

    #[test]
    fn test_document_to_book() {
        let id = ObjectId::new();
        let now = BsonDateTime::now();
        let book = Book::from(BookDocument {
            id,
            titulo: "A".into(),
            autor: "B".into(),
            editora: "C".into(),
            ano: 2020,
            preco: 9.99,
            created_at: now,
            updated_at: now,
        });
        assert_eq!(book.id, id.to_hex());
        assert_eq!(book.publisher, "C");
        assert_eq!(book.created_at, now.to_chrono());
    }

    #[test]
    fn test_document_field_names() {
        let doc = bson::to_document(&BookDocument {
            id: ObjectId::new(),
            titulo: "A".into(),
            autor: "B".into(),
            editora: "C".into(),
            ano: 2020,
            preco: 9.99,
            created_at: BsonDateTime::now(),
            updated_at: BsonDateTime::now(),
        })
        .unwrap();
        for key in ["_id", "titulo", "autor", "editora", "ano", "preco", "createdAt", "updatedAt"] {
            assert!(doc.contains_key(key), "missing {}", key);
        }
        assert!(matches!(doc.get("createdAt"), Some(bson::Bson::DateTime(_))));
    }
}
