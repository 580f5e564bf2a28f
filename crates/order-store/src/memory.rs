use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    Money, Order, OrderId, Page, PageRequest, Product, Result, StoreError, UserId,
    store::{OrderStore, validate_order_fields},
};

/// Number of calls made to each store operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreCalls {
    pub create: usize,
    pub find_by_id: usize,
    pub find_page_by_owner: usize,
    pub update: usize,
    pub delete: usize,
}

#[derive(Debug, Default)]
struct CallCounters {
    create: AtomicUsize,
    find_by_id: AtomicUsize,
    find_page_by_owner: AtomicUsize,
    update: AtomicUsize,
    delete: AtomicUsize,
}

#[derive(Debug, Default)]
struct MemoryState {
    /// Orders keyed by ID, each with its insertion sequence number.
    orders: HashMap<OrderId, (u64, Order)>,
    next_seq: u64,
}

impl MemoryState {
    fn insert(&mut self, order: Order) {
        self.next_seq += 1;
        self.orders.insert(order.id, (self.next_seq, order));
    }
}

/// In-memory order store implementation for testing.
///
/// Provides the same interface as the PostgreSQL implementation and counts
/// every call so tests can assert when the store was (or was not) consulted.
/// Clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOrderStore {
    state: Arc<RwLock<MemoryState>>,
    calls: Arc<CallCounters>,
}

impl InMemoryOrderStore {
    /// Creates a new empty in-memory order store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of orders stored.
    pub async fn order_count(&self) -> usize {
        self.state.read().await.orders.len()
    }

    /// Writes an order directly, bypassing validation and call counting.
    pub async fn insert(&self, order: Order) {
        self.state.write().await.insert(order);
    }

    /// Returns how many times each operation has been called.
    pub fn calls(&self) -> StoreCalls {
        StoreCalls {
            create: self.calls.create.load(Ordering::SeqCst),
            find_by_id: self.calls.find_by_id.load(Ordering::SeqCst),
            find_page_by_owner: self.calls.find_page_by_owner.load(Ordering::SeqCst),
            update: self.calls.update.load(Ordering::SeqCst),
            delete: self.calls.delete.load(Ordering::SeqCst),
        }
    }

    /// Clears all orders.
    pub async fn clear(&self) {
        self.state.write().await.orders.clear();
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn create(
        &self,
        id: OrderId,
        user_id: UserId,
        product: Product,
        quantity: u32,
        price: Money,
    ) -> Result<Order> {
        self.calls.create.fetch_add(1, Ordering::SeqCst);
        validate_order_fields(&product, quantity, price)?;

        let mut state = self.state.write().await;
        if state.orders.contains_key(&id) {
            return Err(StoreError::Validation(format!("Order {id} already exists")));
        }

        let order = Order::new(id, user_id, product, quantity, price);
        state.insert(order.clone());
        Ok(order)
    }

    async fn find_by_id(&self, id: OrderId) -> Result<Order> {
        self.calls.find_by_id.fetch_add(1, Ordering::SeqCst);

        let state = self.state.read().await;
        state
            .orders
            .get(&id)
            .map(|(_, order)| order.clone())
            .ok_or(StoreError::NotFound(id))
    }

    async fn find_page_by_owner(
        &self,
        user_id: UserId,
        request: PageRequest,
    ) -> Result<Page<Order>> {
        self.calls.find_page_by_owner.fetch_add(1, Ordering::SeqCst);
        request.validate()?;

        let state = self.state.read().await;
        let mut owned: Vec<_> = state
            .orders
            .values()
            .filter(|(_, order)| order.user_id == user_id)
            .collect();
        owned.sort_by_key(|(seq, _)| *seq);

        let total_items = owned.len() as u64;
        let offset = usize::try_from(request.offset()).unwrap_or(usize::MAX);
        let items = owned
            .into_iter()
            .skip(offset)
            .take(request.size as usize)
            .map(|(_, order)| order.clone())
            .collect();

        Ok(Page::new(items, request, total_items))
    }

    async fn update(
        &self,
        id: OrderId,
        product: Product,
        price: Money,
        quantity: u32,
    ) -> Result<Order> {
        self.calls.update.fetch_add(1, Ordering::SeqCst);

        let mut state = self.state.write().await;
        let (_, order) = state.orders.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        validate_order_fields(&product, quantity, price)?;

        order.apply_update(product, price, quantity);
        Ok(order.clone())
    }

    async fn delete(&self, id: OrderId) -> Result<()> {
        self.calls.delete.fetch_add(1, Ordering::SeqCst);

        let mut state = self.state.write().await;
        state
            .orders
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn create_widget(store: &InMemoryOrderStore, user_id: UserId) -> Order {
        store
            .create(
                OrderId::new(),
                user_id,
                Product::new("Widget"),
                3,
                Money::from_cents(999),
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn create_and_find() {
        let store = InMemoryOrderStore::new();
        let user_id = UserId::new();

        let created = create_widget(&store, user_id).await;
        let found = store.find_by_id(created.id).await.unwrap();

        assert_eq!(found, created);
        assert_eq!(found.user_id, user_id);
        assert_eq!(store.order_count().await, 1);
    }

    #[tokio::test]
    async fn create_rejects_invalid_fields() {
        let store = InMemoryOrderStore::new();

        let result = store
            .create(
                OrderId::new(),
                UserId::new(),
                Product::new("Widget"),
                0,
                Money::from_cents(999),
            )
            .await;

        assert!(matches!(result, Err(StoreError::Validation(_))));
        assert_eq!(store.order_count().await, 0);
    }

    #[tokio::test]
    async fn create_rejects_duplicate_id() {
        let store = InMemoryOrderStore::new();
        let order = create_widget(&store, UserId::new()).await;

        let result = store
            .create(
                order.id,
                order.user_id,
                Product::new("Gadget"),
                1,
                Money::from_cents(100),
            )
            .await;

        assert!(matches!(result, Err(StoreError::Validation(_))));
    }

    #[tokio::test]
    async fn find_missing_order() {
        let store = InMemoryOrderStore::new();
        let id = OrderId::new();

        let result = store.find_by_id(id).await;
        assert!(matches!(result, Err(StoreError::NotFound(missing)) if missing == id));
    }

    #[tokio::test]
    async fn update_replaces_mutable_fields() {
        let store = InMemoryOrderStore::new();
        let order = create_widget(&store, UserId::new()).await;

        let updated = store
            .update(order.id, Product::new("Gadget"), Money::from_cents(500), 7)
            .await
            .unwrap();

        assert_eq!(updated.id, order.id);
        assert_eq!(updated.user_id, order.user_id);
        assert_eq!(updated.product.as_str(), "Gadget");
        assert_eq!(updated.price.cents(), 500);
        assert_eq!(updated.quantity, 7);
        assert_eq!(store.find_by_id(order.id).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn update_missing_order() {
        let store = InMemoryOrderStore::new();

        let result = store
            .update(OrderId::new(), Product::new("Gadget"), Money::from_cents(500), 1)
            .await;

        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn invalid_update_leaves_order_untouched() {
        let store = InMemoryOrderStore::new();
        let order = create_widget(&store, UserId::new()).await;

        let result = store
            .update(order.id, Product::new("Gadget"), Money::zero(), 1)
            .await;

        assert!(matches!(result, Err(StoreError::Validation(_))));
        assert_eq!(store.find_by_id(order.id).await.unwrap(), order);
    }

    #[tokio::test]
    async fn delete_removes_order() {
        let store = InMemoryOrderStore::new();
        let order = create_widget(&store, UserId::new()).await;

        store.delete(order.id).await.unwrap();

        assert!(matches!(
            store.find_by_id(order.id).await,
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            store.delete(order.id).await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn pages_are_owner_scoped_and_ordered() {
        let store = InMemoryOrderStore::new();
        let owner = UserId::new();
        let other = UserId::new();

        let mut created = Vec::new();
        for _ in 0..5 {
            created.push(create_widget(&store, owner).await.id);
            create_widget(&store, other).await;
        }

        let first = store
            .find_page_by_owner(owner, PageRequest::new(0, 2))
            .await
            .unwrap();
        let last = store
            .find_page_by_owner(owner, PageRequest::new(2, 2))
            .await
            .unwrap();

        assert_eq!(first.total_items, 5);
        assert_eq!(first.total_pages, 3);
        assert_eq!(
            first.items.iter().map(|o| o.id).collect::<Vec<_>>(),
            created[0..2]
        );
        assert_eq!(last.items.len(), 1);
        assert_eq!(last.items[0].id, created[4]);
        assert!(first.items.iter().all(|o| o.user_id == owner));
    }

    #[tokio::test]
    async fn page_past_the_end_is_empty() {
        let store = InMemoryOrderStore::new();
        let owner = UserId::new();
        create_widget(&store, owner).await;

        let page = store
            .find_page_by_owner(owner, PageRequest::new(5, 10))
            .await
            .unwrap();

        assert!(page.items.is_empty());
        assert_eq!(page.total_items, 1);
    }

    #[tokio::test]
    async fn calls_are_counted() {
        let store = InMemoryOrderStore::new();
        let order = create_widget(&store, UserId::new()).await;
        store.find_by_id(order.id).await.unwrap();
        let _ = store.find_by_id(OrderId::new()).await;
        store
            .find_page_by_owner(order.user_id, PageRequest::default())
            .await
            .unwrap();

        let calls = store.calls();
        assert_eq!(calls.create, 1);
        assert_eq!(calls.find_by_id, 2);
        assert_eq!(calls.find_page_by_owner, 1);
        assert_eq!(calls.update, 0);
        assert_eq!(calls.delete, 0);
    }

    #[tokio::test]
    async fn insert_bypasses_counters() {
        let store = InMemoryOrderStore::new();
        let order = Order::new(
            OrderId::new(),
            UserId::new(),
            "Widget",
            1,
            Money::from_cents(100),
        );

        store.insert(order.clone()).await;

        assert_eq!(store.calls(), StoreCalls::default());
        assert_eq!(store.find_by_id(order.id).await.unwrap(), order);
    }
}
