//! Demo scripts shipped with the storefront.
//!
//! Selectors target the `data-demo` attributes rendered by the storefront markup.
//! Order rows are matched by prefix and suffix because their identifiers are only
//! known at run time.

use crate::demo::{DemoRole, DemoScript, DemoStep};

pub const USER_SCRIPT_NAME: &str = "user";
pub const ADMIN_SCRIPT_NAME: &str = "admin";

const ORDER_VIEW_SELECTOR: &str = r#"[data-demo^="order-"][data-demo$="-view"]"#;
const ORDER_STATUS_SELECTOR: &str = r#"[data-demo^="order-"][data-demo$="-status"]"#;

/// Customer flow: browse a category, add a product, check out, and pay.
pub fn user_demo_script() -> DemoScript {
    DemoScript::new(
        USER_SCRIPT_NAME,
        vec![
            DemoStep::navigate("/"),
            DemoStep::wait(1000),
            DemoStep::click(r#"[data-demo="category-Burgers"]"#).with_delay(500),
            DemoStep::wait(1000),
            DemoStep::click(r#"[data-demo^="product-"][data-demo$="-add"]"#).with_delay(500),
            DemoStep::wait(500),
            DemoStep::click(r#"[data-demo="cart-icon"]"#).with_delay(500),
            DemoStep::wait(1000),
            DemoStep::click(r#"[data-demo="checkout-btn"]"#).with_delay(500),
            DemoStep::wait(1000),
            DemoStep::fill(r#"[data-demo="firstname-input"]"#, "Demo"),
            DemoStep::fill(r#"[data-demo="address-input"]"#, "123 Demo St"),
            DemoStep::fill(r#"[data-demo="contact-input"]"#, "9999999999"),
            DemoStep::click(r#"[data-demo="place-order-btn"]"#).with_delay(500),
            DemoStep::simulate_payment().with_delay(1000),
            DemoStep::wait(2000),
        ],
    )
}

/// Admin flow: open the orders table and walk one order through its statuses.
pub fn admin_demo_script() -> DemoScript {
    DemoScript::new(
        ADMIN_SCRIPT_NAME,
        vec![
            DemoStep::navigate("/admin"),
            DemoStep::wait(1000),
            DemoStep::click(r#"[data-demo="orders-link"]"#).with_delay(500),
            DemoStep::wait(1000),
            DemoStep::click(ORDER_VIEW_SELECTOR).with_delay(500),
            DemoStep::wait(1000),
            DemoStep::click(ORDER_STATUS_SELECTOR).with_delay(500),
            DemoStep::wait(500),
            DemoStep::fill(ORDER_STATUS_SELECTOR, "processing"),
            DemoStep::wait(2000),
            DemoStep::fill(ORDER_STATUS_SELECTOR, "out_for_delivery"),
            DemoStep::wait(2000),
            DemoStep::fill(ORDER_STATUS_SELECTOR, "delivered"),
            DemoStep::wait(2000),
        ],
    )
}

/// Returns the shipped script for `role`.
pub fn script_for(role: DemoRole) -> DemoScript {
    match role {
        DemoRole::User => user_demo_script(),
        DemoRole::Admin => admin_demo_script(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::DemoAction;

    #[test]
    fn shipped_scripts_only_use_known_actions() {
        for role in [DemoRole::User, DemoRole::Admin] {
            let script = script_for(role);
            assert!(!script.is_empty());
            assert!(script.steps.iter().all(|step| step.action.is_known()), "{role} script has unknown actions");
        }
    }

    #[test]
    fn user_script_fills_checkout_before_paying() {
        let script = user_demo_script();
        let fills: Vec<_> = script.steps.iter().filter(|step| step.action == DemoAction::Fill).collect();
        assert_eq!(fills.len(), 3);
        let payment_index = script
            .steps
            .iter()
            .position(|step| step.action == DemoAction::SimulatePayment)
            .expect("payment step");
        assert_eq!(script.steps[payment_index - 1].selector.as_deref(), Some(r#"[data-demo="place-order-btn"]"#));
    }

    #[test]
    fn selector_steps_always_carry_a_selector() {
        for script in [user_demo_script(), admin_demo_script()] {
            for step in &script.steps {
                if matches!(step.action, DemoAction::Click | DemoAction::Fill) {
                    assert!(step.selector.is_some(), "{} step without selector in {}", step.action, script.name);
                }
            }
        }
    }
}
