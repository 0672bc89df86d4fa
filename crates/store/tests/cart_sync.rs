use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use savor_store::{AuthStore, CartBackend, CartCoordinator, CartError, CartLocation, InMemoryAuthStore, LocalCartFile};
use savor_types::{CartItem, Credentials, Product, StorefrontUser};

#[derive(Default)]
struct FakeBackend {
    items: Mutex<Vec<CartItem>>,
    replace_calls: Mutex<usize>,
}

#[async_trait]
impl CartBackend for FakeBackend {
    async fn fetch_cart(&self) -> anyhow::Result<Vec<CartItem>> {
        Ok(self.items.lock().unwrap().clone())
    }

    async fn add_item(&self, product_id: &str, quantity: u32) -> anyhow::Result<()> {
        let mut items = self.items.lock().unwrap();
        match items.iter_mut().find(|item| item.id == product_id) {
            Some(item) => {
                let total = item.quantity + quantity;
                item.set_quantity(total);
            }
            None => items.push(CartItem {
                id: product_id.into(),
                title: String::new(),
                image: None,
                price: 1.0,
                quantity,
                total_price: f64::from(quantity),
            }),
        }
        Ok(())
    }

    async fn replace_cart(&self, items: &[CartItem]) -> anyhow::Result<Vec<CartItem>> {
        *self.replace_calls.lock().unwrap() += 1;
        *self.items.lock().unwrap() = items.to_vec();
        Ok(items.to_vec())
    }

    async fn update_quantity(&self, product_id: &str, quantity: u32) -> anyhow::Result<()> {
        let mut items = self.items.lock().unwrap();
        let item = items
            .iter_mut()
            .find(|item| item.id == product_id)
            .ok_or_else(|| anyhow::anyhow!("no such line"))?;
        item.set_quantity(quantity);
        Ok(())
    }

    async fn remove_item(&self, product_id: &str) -> anyhow::Result<()> {
        self.items.lock().unwrap().retain(|item| item.id != product_id);
        Ok(())
    }
}

fn product(id: &str, price: f64) -> Product {
    Product {
        id: id.into(),
        title: format!("Product {id}"),
        image: None,
        price,
        category: None,
    }
}

fn sign_in(auth: &InMemoryAuthStore) {
    auth.set_credentials(Credentials {
        access_token: "demo-token".into(),
        user: StorefrontUser {
            id: "demo-user".into(),
            ..StorefrontUser::default()
        },
    });
}

#[tokio::test]
async fn guest_adds_stay_local_and_persist() {
    let temp_dir = tempfile::tempdir().unwrap();
    let file = LocalCartFile::new(temp_dir.path().join("cart.json"));
    let auth = Arc::new(InMemoryAuthStore::new());
    let backend = Arc::new(FakeBackend::default());

    let mut coordinator = CartCoordinator::new(auth.clone(), backend.clone(), Some(file.clone())).unwrap();
    let location = coordinator.add_product(&product("p1", 4.0)).await.unwrap();

    assert_eq!(location, CartLocation::Local);
    assert!(backend.items.lock().unwrap().is_empty());
    assert_eq!(file.load().unwrap().total_quantity(), 1);
}

#[tokio::test]
async fn login_merges_guest_cart_into_remote_once() {
    let temp_dir = tempfile::tempdir().unwrap();
    let file = LocalCartFile::new(temp_dir.path().join("cart.json"));
    let auth = Arc::new(InMemoryAuthStore::new());
    let backend = Arc::new(FakeBackend::default());
    backend.add_item("p1", 2).await.unwrap();

    let mut coordinator = CartCoordinator::new(auth.clone(), backend.clone(), Some(file.clone())).unwrap();
    coordinator.add_product(&product("p1", 1.0)).await.unwrap();
    coordinator.add_product(&product("p2", 3.0)).await.unwrap();

    sign_in(&auth);
    let merged = coordinator.reconcile_after_login().await.unwrap();
    let quantities: Vec<_> = merged.iter().map(|item| (item.id.as_str(), item.quantity)).collect();
    assert_eq!(quantities, vec![("p1", 3), ("p2", 1)]);
    assert!(coordinator.local_cart().is_empty());
    assert!(!file.path().exists());

    // A second reconcile has nothing left to merge.
    coordinator.reconcile_after_login().await.unwrap();
    assert_eq!(*backend.replace_calls.lock().unwrap(), 1);
}

#[tokio::test]
async fn signed_in_changes_go_remote() {
    let auth = Arc::new(InMemoryAuthStore::new());
    sign_in(&auth);
    let backend = Arc::new(FakeBackend::default());
    let mut coordinator = CartCoordinator::new(auth, backend.clone(), None).unwrap();

    assert_eq!(coordinator.add_product(&product("p7", 2.0)).await.unwrap(), CartLocation::Remote);
    assert_eq!(coordinator.update_quantity("p7", 5).await.unwrap(), CartLocation::Remote);
    assert_eq!(coordinator.current_items().await.unwrap()[0].quantity, 5);
    assert!(coordinator.local_cart().is_empty());

    assert!(matches!(
        coordinator.update_quantity("p7", 0).await,
        Err(CartError::InvalidQuantity { .. })
    ));
    coordinator.remove_item("p7").await.unwrap();
    assert!(backend.items.lock().unwrap().is_empty());
}
