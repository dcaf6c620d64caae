//! Integration tests for tally-core
//!
//! These tests exercise the full message -> store -> reply workflow through
//! the public API.

use std::sync::Arc;

use rust_decimal::Decimal;
use tally_core::{
    conversation::messages, distinct_categories, monthly_stats, resolve_partition,
    sum_by_category, CategoryFilter, ChatId, Conversation, Messenger, PartitionKey, RecordStore,
    RecordingMessenger, Reply, DEFAULT_PROMPT_TIMEOUT,
};

const CHAT: ChatId = ChatId(1001);

fn setup() -> (tempfile::TempDir, Arc<RecordStore>, Conversation) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let store = Arc::new(RecordStore::new(dir.path().join("users")).expect("Failed to open store"));
    let conversation = Conversation::new(store.clone(), DEFAULT_PROMPT_TIMEOUT);
    (dir, store, conversation)
}

/// Feed a message through the conversation and deliver the replies
async fn chat(conversation: &Conversation, messenger: &RecordingMessenger, text: &str) {
    let replies = conversation.respond(CHAT, text).await.expect("respond failed");
    for reply in &replies {
        messenger.deliver(CHAT, reply).await.expect("deliver failed");
    }
}

// =============================================================================
// Conversation Workflow Tests
// =============================================================================

#[tokio::test]
async fn test_month_of_expenses_workflow() {
    let (_dir, store, conversation) = setup();
    let messenger = RecordingMessenger::new();

    chat(&conversation, &messenger, "/add").await;
    chat(&conversation, &messenger, "Coffee, 50000, Food, 01-03-2024").await;
    chat(&conversation, &messenger, "/add Taxi, 120000, Transport, 15-03-2024").await;
    chat(&conversation, &messenger, "/add Lunch, 45000.5, Food, 20-03-2024").await;
    chat(&conversation, &messenger, "/add Rent, 5000000, Housing, 01-04-2024").await;
    chat(&conversation, &messenger, "/stats 03-2024").await;

    let texts = messenger.texts_for(CHAT);
    assert_eq!(
        texts.last().unwrap(),
        "Spending for 03-2024:\n- Total: 215.000,5 ₫\n- Food: 95.000,5 ₫\n- Transport: 120.000 ₫"
    );

    // Every record sits in the partition its date resolves to
    let db = store.ensure_store(CHAT).unwrap();
    for summary in db.list_partitions().unwrap() {
        for expense in db.read_partition(&summary.key).unwrap() {
            assert_eq!(resolve_partition(&expense.date).unwrap(), summary.key);
        }
    }
}

#[tokio::test]
async fn test_category_sums_add_up() {
    let (_dir, store, conversation) = setup();
    let messenger = RecordingMessenger::new();

    for text in [
        "/add Coffee, 50000, Food, 01-03-2024",
        "/add Bus, 7000, Transport, 02-03-2024",
        "/add Dinner, 250000, Food, 03-03-2024",
        "/add Book, 99000, Leisure, 04-03-2024",
    ] {
        chat(&conversation, &messenger, text).await;
    }

    let march = PartitionKey::new(3, 2024).unwrap();
    let expenses = store.ensure_store(CHAT).unwrap().read_partition(&march).unwrap();
    let total = sum_by_category(&expenses, &CategoryFilter::All).unwrap();
    let per_category: Decimal = distinct_categories(&expenses)
        .into_iter()
        .map(|c| sum_by_category(&expenses, &CategoryFilter::Exact(c)).unwrap())
        .sum();

    assert_eq!(total, Decimal::from(406_000));
    assert_eq!(total, per_category);
    assert_eq!(monthly_stats(&expenses).unwrap().by_category.len(), 3);
}

#[tokio::test]
async fn test_delete_then_export() {
    let (_dir, store, conversation) = setup();
    let messenger = RecordingMessenger::new();
    let march = PartitionKey::new(3, 2024).unwrap();

    chat(&conversation, &messenger, "/add Coffee, 50000, Food, 01-03-2024").await;
    chat(&conversation, &messenger, "/add Taxi, 120000, Transport, 15-03-2024").await;
    let coffee_id = store.ensure_store(CHAT).unwrap().read_partition(&march).unwrap()[0]
        .id
        .clone();

    chat(&conversation, &messenger, "/delete 03-2024").await;
    chat(&conversation, &messenger, &coffee_id).await;
    assert_eq!(messenger.texts_for(CHAT).last().unwrap(), messages::DELETED);

    let replies = conversation.respond(CHAT, "/export").await.unwrap();
    let Some(Reply::Document(file)) = replies.first() else {
        panic!("expected a document");
    };
    let csv = String::from_utf8(file.bytes.clone()).unwrap();
    assert!(!csv.contains("Coffee"));
    assert!(csv.contains("Taxi"));
    assert_eq!(csv.lines().count(), 2);
}

#[tokio::test]
async fn test_store_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let data_dir = dir.path().join("users");

    {
        let store = Arc::new(RecordStore::new(&data_dir).unwrap());
        let conversation = Conversation::new(store, DEFAULT_PROMPT_TIMEOUT);
        conversation
            .respond(CHAT, "/add Coffee, 50000, Food, 01-03-2024")
            .await
            .unwrap();
    }

    let store = Arc::new(RecordStore::new(&data_dir).unwrap());
    let conversation = Conversation::new(store, DEFAULT_PROMPT_TIMEOUT);
    let replies = conversation.respond(CHAT, "/view 03-2024").await.unwrap();
    assert!(replies[0]
        .as_text()
        .unwrap()
        .contains("Coffee: 50000 VND (Food, 01-03-2024)"));
}
