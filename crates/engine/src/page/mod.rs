//! In-memory page used to run demo scripts without a browser.
//!
//! [`HeadlessPage`] keeps a flat list of elements, each visible on a set of
//! routes (or on every route), and implements both [`PageDriver`] and
//! [`Navigator`]. Clicking an element with a link target changes the route.
//! Elements hidden by a route change lose their runtime classes and value, the
//! way a re-rendered view would.

mod fixture;
mod selector;

use std::sync::{Mutex, MutexGuard};

use indexmap::IndexMap;
use tracing::{debug, warn};

pub use fixture::storefront_fixture;
pub use selector::{AttributeOperator, Selector, SelectorError, SelectorSubject, SimpleSelector};

use crate::host::{DomEvent, ElementHandle, Navigator, PageDriver};
use crate::runner::HIGHLIGHT_CLASS;

/// Declarative element description used to populate a [`HeadlessPage`].
#[derive(Debug, Clone, PartialEq)]
pub struct PageElement {
    tag: String,
    attributes: IndexMap<String, String>,
    classes: Vec<String>,
    value: String,
    routes: Vec<String>,
    link: Option<String>,
}

impl PageElement {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            attributes: IndexMap::new(),
            classes: Vec::new(),
            value: String::new(),
            routes: Vec::new(),
            link: None,
        }
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Shorthand for the `data-demo` attribute scripts target.
    pub fn demo_id(self, id: impl Into<String>) -> Self {
        self.attr("data-demo", id)
    }

    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    /// Restricts the element to `route`. May be repeated; an element without
    /// routes is visible everywhere.
    pub fn on_route(mut self, route: impl Into<String>) -> Self {
        self.routes.push(route.into());
        self
    }

    /// Route the page navigates to when the element is clicked.
    pub fn links_to(mut self, path: impl Into<String>) -> Self {
        self.link = Some(path.into());
        self
    }

    fn visible_on(&self, route: &str) -> bool {
        self.routes.is_empty() || self.routes.iter().any(|candidate| candidate == route)
    }
}

/// Observable state of one element.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementSnapshot {
    pub tag: String,
    pub attributes: IndexMap<String, String>,
    pub classes: Vec<String>,
    pub value: String,
    pub clicks: usize,
    pub scrolls: usize,
    pub events: Vec<DomEvent>,
}

#[derive(Debug)]
struct MountedElement {
    template: PageElement,
    classes: Vec<String>,
    value: String,
    clicks: usize,
    scrolls: usize,
    events: Vec<DomEvent>,
}

impl MountedElement {
    fn new(template: PageElement) -> Self {
        Self {
            classes: template.classes.clone(),
            value: template.value.clone(),
            template,
            clicks: 0,
            scrolls: 0,
            events: Vec::new(),
        }
    }

    fn unmount(&mut self) {
        self.classes = self.template.classes.clone();
        self.value = self.template.value.clone();
    }

    fn snapshot(&self) -> ElementSnapshot {
        ElementSnapshot {
            tag: self.template.tag.clone(),
            attributes: self.template.attributes.clone(),
            classes: self.classes.clone(),
            value: self.value.clone(),
            clicks: self.clicks,
            scrolls: self.scrolls,
            events: self.events.clone(),
        }
    }
}

impl SelectorSubject for MountedElement {
    fn tag(&self) -> &str {
        &self.template.tag
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.template.attributes.get(name).map(String::as_str)
    }

    fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|candidate| candidate == class)
    }
}

#[derive(Debug)]
struct PageState {
    route: String,
    history: Vec<String>,
    elements: Vec<MountedElement>,
}

impl PageState {
    fn element_mut(&mut self, element: ElementHandle) -> Option<&mut MountedElement> {
        usize::try_from(element.id()).ok().and_then(|index| self.elements.get_mut(index))
    }

    fn go_to(&mut self, path: &str) {
        self.route = path.to_string();
        self.history.push(path.to_string());
        for element in &mut self.elements {
            if !element.template.visible_on(path) {
                element.unmount();
            }
        }
    }
}

/// Headless stand-in for the storefront page.
#[derive(Debug)]
pub struct HeadlessPage {
    state: Mutex<PageState>,
}

impl HeadlessPage {
    pub fn new(initial_route: impl Into<String>) -> Self {
        Self {
            state: Mutex::new(PageState {
                route: initial_route.into(),
                history: Vec::new(),
                elements: Vec::new(),
            }),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, PageState> {
        self.state.lock().expect("page state lock poisoned")
    }

    pub fn add_element(&self, element: PageElement) -> ElementHandle {
        let mut state = self.lock_state();
        state.elements.push(MountedElement::new(element));
        ElementHandle::new((state.elements.len() - 1) as u64)
    }

    /// Builder form of [`HeadlessPage::add_element`].
    pub fn with_element(self, element: PageElement) -> Self {
        self.add_element(element);
        self
    }

    pub fn current_route(&self) -> String {
        self.lock_state().route.clone()
    }

    /// Every route navigated to, oldest first. The initial route is not included.
    pub fn history(&self) -> Vec<String> {
        self.lock_state().history.clone()
    }

    pub fn element(&self, element: ElementHandle) -> Option<ElementSnapshot> {
        let state = self.lock_state();
        let index = usize::try_from(element.id()).ok()?;
        state.elements.get(index).map(MountedElement::snapshot)
    }

    /// Snapshot of the first visible element matching `selector`.
    pub fn find(&self, selector: &str) -> Option<ElementSnapshot> {
        self.query_selector(selector).and_then(|element| self.element(element))
    }

    pub fn value_of(&self, selector: &str) -> Option<String> {
        self.find(selector).map(|element| element.value)
    }

    /// Every element, visible or not, currently carrying the highlight class.
    pub fn highlighted(&self) -> Vec<ElementHandle> {
        self.lock_state()
            .elements
            .iter()
            .enumerate()
            .filter(|(_, element)| element.has_class(HIGHLIGHT_CLASS))
            .map(|(index, _)| ElementHandle::new(index as u64))
            .collect()
    }
}

impl PageDriver for HeadlessPage {
    fn query_selector(&self, selector: &str) -> Option<ElementHandle> {
        let parsed = match Selector::parse(selector) {
            Ok(parsed) => parsed,
            Err(error) => {
                warn!(selector, %error, "invalid selector");
                return None;
            }
        };
        let state = self.lock_state();
        state
            .elements
            .iter()
            .position(|element| element.template.visible_on(&state.route) && parsed.matches(element))
            .map(|index| ElementHandle::new(index as u64))
    }

    fn scroll_into_view(&self, element: ElementHandle) {
        if let Some(mounted) = self.lock_state().element_mut(element) {
            mounted.scrolls += 1;
        }
    }

    fn add_class(&self, element: ElementHandle, class: &str) {
        if let Some(mounted) = self.lock_state().element_mut(element)
            && !mounted.has_class(class)
        {
            mounted.classes.push(class.to_string());
        }
    }

    fn remove_class(&self, element: ElementHandle, class: &str) {
        if let Some(mounted) = self.lock_state().element_mut(element) {
            mounted.classes.retain(|candidate| candidate != class);
        }
    }

    fn click(&self, element: ElementHandle) {
        let mut state = self.lock_state();
        let Some(mounted) = state.element_mut(element) else {
            return;
        };
        mounted.clicks += 1;
        if let Some(path) = mounted.template.link.clone() {
            debug!(path, "followed link");
            state.go_to(&path);
        }
    }

    fn set_value(&self, element: ElementHandle, value: &str) {
        if let Some(mounted) = self.lock_state().element_mut(element) {
            mounted.value = value.to_string();
        }
    }

    fn dispatch_event(&self, element: ElementHandle, event: DomEvent) {
        if let Some(mounted) = self.lock_state().element_mut(element) {
            mounted.events.push(event);
        }
    }
}

impl Navigator for HeadlessPage {
    fn navigate(&self, path: &str) {
        debug!(path, "navigating");
        self.lock_state().go_to(path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queries_respect_route_visibility() {
        let page = HeadlessPage::new("/")
            .with_element(PageElement::new("a").demo_id("cart-icon").links_to("/cart"))
            .with_element(PageElement::new("button").demo_id("checkout-btn").on_route("/cart"));

        assert!(page.query_selector(r#"[data-demo="checkout-btn"]"#).is_none());
        let icon = page.query_selector(r#"[data-demo="cart-icon"]"#).unwrap();
        page.click(icon);

        assert_eq!(page.current_route(), "/cart");
        assert_eq!(page.history(), vec!["/cart".to_string()]);
        assert!(page.query_selector(r#"[data-demo="checkout-btn"]"#).is_some());
        assert_eq!(page.element(icon).unwrap().clicks, 1);
    }

    #[test]
    fn leaving_a_route_resets_runtime_state() {
        let page = HeadlessPage::new("/checkout")
            .with_element(PageElement::new("input").demo_id("firstname-input").on_route("/checkout"));
        let input = page.query_selector("input").unwrap();
        page.set_value(input, "Demo");
        page.add_class(input, HIGHLIGHT_CLASS);
        page.add_class(input, HIGHLIGHT_CLASS);
        assert_eq!(page.highlighted(), vec![input]);
        assert_eq!(page.element(input).unwrap().classes, vec![HIGHLIGHT_CLASS.to_string()]);

        page.navigate("/");
        let snapshot = page.element(input).unwrap();
        assert!(snapshot.value.is_empty());
        assert!(page.highlighted().is_empty());
    }

    #[test]
    fn invalid_selectors_match_nothing() {
        let page = HeadlessPage::new("/").with_element(PageElement::new("div"));
        assert!(page.query_selector("div > span").is_none());
        assert!(page.query_selector("div").is_some());
    }
}
