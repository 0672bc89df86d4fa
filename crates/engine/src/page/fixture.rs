use super::{HeadlessPage, PageElement};

/// Storefront markup covering the routes and `data-demo` targets of both shipped
/// demo scripts. Starts on `/`.
pub fn storefront_fixture() -> HeadlessPage {
    HeadlessPage::new("/")
        // Header, rendered everywhere.
        .with_element(PageElement::new("a").demo_id("cart-icon").class("cart__icon").links_to("/cart"))
        // Home and category menu.
        .with_element(
            PageElement::new("button")
                .demo_id("category-Burgers")
                .on_route("/")
                .links_to("/menu/Burgers"),
        )
        .with_element(
            PageElement::new("button")
                .demo_id("category-Pizza")
                .on_route("/")
                .links_to("/menu/Pizza"),
        )
        .with_element(
            PageElement::new("button")
                .demo_id("product-01-add")
                .class("addToCart__btn")
                .on_route("/")
                .on_route("/menu/Burgers"),
        )
        .with_element(
            PageElement::new("button")
                .demo_id("product-07-add")
                .class("addToCart__btn")
                .on_route("/menu/Pizza"),
        )
        // Cart and checkout.
        .with_element(
            PageElement::new("button")
                .demo_id("checkout-btn")
                .on_route("/cart")
                .links_to("/checkout"),
        )
        .with_element(PageElement::new("input").demo_id("firstname-input").attr("name", "firstName").on_route("/checkout"))
        .with_element(PageElement::new("input").demo_id("address-input").attr("name", "address").on_route("/checkout"))
        .with_element(PageElement::new("input").demo_id("contact-input").attr("name", "contact").on_route("/checkout"))
        .with_element(PageElement::new("button").demo_id("place-order-btn").attr("type", "submit").on_route("/checkout"))
        // Admin dashboard.
        .with_element(
            PageElement::new("a")
                .demo_id("orders-link")
                .on_route("/admin")
                .on_route("/admin/orders")
                .links_to("/admin/orders"),
        )
        .with_element(PageElement::new("button").demo_id("order-1001-view").on_route("/admin/orders"))
        .with_element(
            PageElement::new("select")
                .demo_id("order-1001-status")
                .value("pending")
                .on_route("/admin/orders"),
        )
}
