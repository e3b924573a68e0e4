//! Data models for the bookstore

pub mod book;

pub use book::{Book, BookChanges, BookId, BookPage, CreateBook, NewBook, Pagination, UpdateBook};
