use super::*;

const ALICE: ChatId = ChatId(111);
const BOB: ChatId = ChatId(222);

fn conversation_with_timeout(timeout: Duration) -> (tempfile::TempDir, Conversation) {
    let dir = tempfile::tempdir().unwrap();
    let store = RecordStore::new(dir.path().join("users")).unwrap();
    (dir, Conversation::new(Arc::new(store), timeout))
}

fn conversation() -> (tempfile::TempDir, Conversation) {
    conversation_with_timeout(DEFAULT_PROMPT_TIMEOUT)
}

/// Send a message and collect the text replies
async fn say(conversation: &Conversation, chat: ChatId, text: &str) -> Vec<String> {
    conversation
        .respond(chat, text)
        .await
        .unwrap()
        .iter()
        .filter_map(|r| r.as_text().map(str::to_string))
        .collect()
}

fn month(month: u32, year: i32) -> PartitionKey {
    PartitionKey::new(month, year).unwrap()
}

fn stored_ids(conversation: &Conversation, chat: ChatId, key: &PartitionKey) -> Vec<String> {
    conversation
        .store()
        .ensure_store(chat)
        .unwrap()
        .read_partition(key)
        .unwrap()
        .into_iter()
        .map(|e| e.id)
        .collect()
}

#[tokio::test]
async fn test_start_and_help() {
    let (_dir, conv) = conversation();
    assert_eq!(say(&conv, ALICE, "/start").await, vec![messages::WELCOME]);
    assert_eq!(say(&conv, ALICE, "/help").await, vec![messages::HELP]);
}

#[tokio::test]
async fn test_add_then_stats() {
    let (_dir, conv) = conversation();

    assert_eq!(say(&conv, ALICE, "/add").await, vec![messages::add_prompt()]);
    let replies = say(&conv, ALICE, "Coffee, 50000, Food, 01-03-2024").await;
    let id = &stored_ids(&conv, ALICE, &month(3, 2024))[0];
    assert_eq!(
        replies,
        vec![format!(
            "Added Coffee (50000 VND) on 01-03-2024 to T03-2024. ID: {}",
            id
        )]
    );

    say(&conv, ALICE, "/add").await;
    say(&conv, ALICE, "Bus, 120000, Transport, 05-03-2024").await;

    assert_eq!(
        say(&conv, ALICE, "/stats").await,
        vec![messages::STATS_PROMPT]
    );
    assert_eq!(
        say(&conv, ALICE, "03-2024").await,
        vec!["Spending for 03-2024:\n- Total: 170.000 ₫\n- Food: 50.000 ₫\n- Transport: 120.000 ₫"]
    );
    assert!(conv.pending().peek(ALICE).await.is_none());
}

#[tokio::test]
async fn test_oversized_amount_is_rejected() {
    let (_dir, conv) = conversation();

    let replies = say(&conv, ALICE, "/add A, 70000000000000000000000000000, Food, 01-03-2024").await;
    assert!(replies[0].contains("Amount must be at most"));
    assert!(stored_ids(&conv, ALICE, &month(3, 2024)).is_empty());
}

#[tokio::test]
async fn test_stats_overflow_replies_instead_of_failing() {
    let (_dir, conv) = conversation();
    say(&conv, ALICE, "/add A, 1, Food, 01-03-2024").await;
    say(&conv, ALICE, "/add B, 1, Food, 02-03-2024").await;

    // Amounts edited by hand straight in the store file
    let db = conv.store().ensure_store(ALICE).unwrap();
    db.conn()
        .unwrap()
        .execute(
            "UPDATE expenses SET amount = ?",
            ["70000000000000000000000000000"],
        )
        .unwrap();

    let replies = say(&conv, ALICE, "/stats 03-2024").await;
    assert_eq!(replies.len(), 1);
    assert!(replies[0].starts_with("Can't total 03-2024:"));
    assert!(conv.pending().peek(ALICE).await.is_none());
}

#[tokio::test]
async fn test_inline_arguments() {
    let (_dir, conv) = conversation();

    let replies = say(&conv, ALICE, "/add@TallyBot Coffee, 50000, Food, 01-03-2024").await;
    assert!(replies[0].starts_with("Added Coffee"));
    assert!(conv.pending().peek(ALICE).await.is_none());

    let replies = say(&conv, ALICE, "/view 3-2024").await;
    assert!(replies[0].starts_with("Expenses for 03-2024:"));
    assert!(replies[0].contains("Coffee: 50000 VND (Food, 01-03-2024)"));
}

#[tokio::test]
async fn test_invalid_expense_keeps_prompt_open() {
    let (_dir, conv) = conversation();
    say(&conv, ALICE, "/add").await;

    let replies = say(&conv, ALICE, "Coffee, fifty, Food, 01-03-2024").await;
    assert!(replies[0].contains("Amount must be a number"));
    assert_eq!(conv.pending().peek(ALICE).await, Some(Step::AwaitingExpense));

    let replies = say(&conv, ALICE, "Coffee, 50000, Food").await;
    assert!(replies[0].contains("Expected 4 comma-separated fields"));

    let replies = say(&conv, ALICE, "Coffee, 50000, Food, 31-02-2024").await;
    assert_eq!(replies.len(), 1);
    assert_eq!(conv.pending().peek(ALICE).await, Some(Step::AwaitingExpense));
    assert!(stored_ids(&conv, ALICE, &month(2, 2024)).is_empty());

    let replies = say(&conv, ALICE, "Coffee, 50000, Food, 01-03-2024").await;
    assert!(replies[0].starts_with("Added"));
    assert_eq!(stored_ids(&conv, ALICE, &month(3, 2024)).len(), 1);
}

#[tokio::test]
async fn test_invalid_month_keeps_prompt_open() {
    let (_dir, conv) = conversation();
    say(&conv, ALICE, "/view").await;

    let replies = say(&conv, ALICE, "March").await;
    assert!(replies[0].contains("Expected a month as mm-yyyy"));
    assert_eq!(
        conv.pending().peek(ALICE).await,
        Some(Step::AwaitingMonth(MonthAction::View))
    );

    let replies = say(&conv, ALICE, "13-2024").await;
    assert_eq!(replies.len(), 1);
    assert!(conv.pending().peek(ALICE).await.is_some());
}

#[tokio::test]
async fn test_empty_month_reports_no_data() {
    let (_dir, conv) = conversation();
    say(&conv, ALICE, "/add Coffee, 50000, Food, 01-03-2024").await;

    assert_eq!(say(&conv, ALICE, "/view 04-2024").await, vec!["No data for 04-2024."]);
    assert_eq!(say(&conv, ALICE, "/stats 04-2024").await, vec!["No data for 04-2024."]);
    assert_eq!(say(&conv, ALICE, "/delete 04-2024").await, vec!["No data for 04-2024."]);
    assert!(conv.pending().peek(ALICE).await.is_none());
}

#[tokio::test]
async fn test_delete_flow() {
    let (_dir, conv) = conversation();
    let march = month(3, 2024);
    say(&conv, ALICE, "/add Coffee, 50000, Food, 01-03-2024").await;
    say(&conv, ALICE, "/add Bus, 120000, Transport, 05-03-2024").await;
    let ids = stored_ids(&conv, ALICE, &march);

    assert_eq!(say(&conv, ALICE, "/delete").await, vec![messages::MONTH_PROMPT]);
    let replies = say(&conv, ALICE, "03-2024").await;
    assert_eq!(replies.len(), 2);
    assert!(replies[0].contains(&ids[0]));
    assert_eq!(replies[1], messages::DELETE_ID_PROMPT);
    assert_eq!(
        conv.pending().peek(ALICE).await,
        Some(Step::AwaitingDeleteId(march))
    );

    assert_eq!(say(&conv, ALICE, &ids[0]).await, vec![messages::DELETED]);
    assert_eq!(stored_ids(&conv, ALICE, &march), vec![ids[1].clone()]);
}

#[tokio::test]
async fn test_delete_unknown_id_still_confirms() {
    let (_dir, conv) = conversation();
    let march = month(3, 2024);
    say(&conv, ALICE, "/add Coffee, 50000, Food, 01-03-2024").await;

    say(&conv, ALICE, "/delete 03-2024").await;
    assert_eq!(say(&conv, ALICE, "no-such-id").await, vec![messages::DELETED]);
    assert_eq!(stored_ids(&conv, ALICE, &march).len(), 1);
}

#[tokio::test]
async fn test_edit_flow_moves_between_months() {
    let (_dir, conv) = conversation();
    let march = month(3, 2024);
    let april = month(4, 2024);
    say(&conv, ALICE, "/add Coffee, 50000, Food, 01-03-2024").await;
    let id = stored_ids(&conv, ALICE, &march).remove(0);

    let replies = say(&conv, ALICE, "/edit 03-2024").await;
    assert_eq!(replies[1], messages::EDIT_ID_PROMPT);

    let replies = say(&conv, ALICE, &id).await;
    assert!(replies[0].starts_with("Current: Coffee, 50000, Food, 01-03-2024"));

    let replies = say(&conv, ALICE, "Tea, 30000, Drinks, 02-04-2024").await;
    assert!(replies[0].starts_with(&format!("Updated expense {}", id)));

    assert!(stored_ids(&conv, ALICE, &march).is_empty());
    assert_eq!(stored_ids(&conv, ALICE, &april), vec![id]);
}

#[tokio::test]
async fn test_edit_unknown_id() {
    let (_dir, conv) = conversation();
    say(&conv, ALICE, "/add Coffee, 50000, Food, 01-03-2024").await;

    say(&conv, ALICE, "/edit 03-2024").await;
    assert_eq!(
        say(&conv, ALICE, "42").await,
        vec!["No expense with ID 42 in 03-2024."]
    );
    assert!(conv.pending().peek(ALICE).await.is_none());
}

#[tokio::test]
async fn test_export_sends_document() {
    let (_dir, conv) = conversation();
    say(&conv, ALICE, "/add Coffee, 50000, Food, 01-03-2024").await;

    let replies = conv.respond(ALICE, "/export").await.unwrap();
    let [Reply::Document(file)] = replies.as_slice() else {
        panic!("expected a single document, got {:?}", replies);
    };
    assert_eq!(file.file_name, "expenses_111.csv");
    let text = String::from_utf8(file.bytes.clone()).unwrap();
    assert!(text.starts_with("Sheet,ID,Name,Amount,Category,Date\n"));
    assert!(text.contains("T03-2024,"));
}

#[tokio::test]
async fn test_chats_are_isolated() {
    let (_dir, conv) = conversation();
    say(&conv, ALICE, "/add").await;

    // Bob's text is not an answer to Alice's prompt
    assert_eq!(
        say(&conv, BOB, "Coffee, 50000, Food, 01-03-2024").await,
        vec![messages::IDLE_HINT]
    );
    assert_eq!(conv.pending().peek(ALICE).await, Some(Step::AwaitingExpense));

    say(&conv, ALICE, "Coffee, 50000, Food, 01-03-2024").await;
    assert_eq!(stored_ids(&conv, ALICE, &month(3, 2024)).len(), 1);
    assert!(stored_ids(&conv, BOB, &month(3, 2024)).is_empty());
}

#[tokio::test]
async fn test_expired_prompt_is_not_answered() {
    let (_dir, conv) = conversation_with_timeout(Duration::ZERO);
    say(&conv, ALICE, "/add").await;

    assert_eq!(
        say(&conv, ALICE, "Coffee, 50000, Food, 01-03-2024").await,
        vec![messages::PROMPT_EXPIRED]
    );
    assert!(stored_ids(&conv, ALICE, &month(3, 2024)).is_empty());
    assert_eq!(say(&conv, ALICE, "hello").await, vec![messages::IDLE_HINT]);
}

#[tokio::test]
async fn test_cancel() {
    let (_dir, conv) = conversation();
    assert_eq!(say(&conv, ALICE, "/cancel").await, vec![messages::NOTHING_TO_CANCEL]);

    say(&conv, ALICE, "/add").await;
    assert_eq!(say(&conv, ALICE, "/cancel").await, vec![messages::CANCELLED]);
    assert_eq!(
        say(&conv, ALICE, "Coffee, 50000, Food, 01-03-2024").await,
        vec![messages::IDLE_HINT]
    );
}

#[tokio::test]
async fn test_new_command_replaces_prompt() {
    let (_dir, conv) = conversation();
    say(&conv, ALICE, "/add").await;
    say(&conv, ALICE, "/help").await;
    assert!(conv.pending().peek(ALICE).await.is_none());

    say(&conv, ALICE, "/add").await;
    say(&conv, ALICE, "/stats").await;
    assert_eq!(
        conv.pending().peek(ALICE).await,
        Some(Step::AwaitingMonth(MonthAction::Stats))
    );
}

#[tokio::test]
async fn test_unknown_command() {
    let (_dir, conv) = conversation();
    say(&conv, ALICE, "/add").await;
    assert_eq!(
        say(&conv, ALICE, "/budget").await,
        vec![messages::unknown_command("budget")]
    );
    // An unknown command leaves the prompt alone
    assert_eq!(conv.pending().peek(ALICE).await, Some(Step::AwaitingExpense));
}
