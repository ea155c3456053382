#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    // unique within the owning user's list, never reused after deletion
    pub id: u64,

    pub user_id: i64,
    pub symbol: String,
    pub target_price: f64,

    // chat the trigger notification is delivered to
    pub chat_id: i64,

    pub created_at: i64,
}
