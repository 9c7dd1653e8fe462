use webcheck::MemoryStore;

use super::exercise_contract;

#[tokio::test]
async fn test_memory_store_contract() {
    exercise_contract(&MemoryStore::new()).await;
}
