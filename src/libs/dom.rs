//! Page-facing ports: element handles, the document holding them, and the
//! OS color-scheme signal. Controllers receive these instead of reaching for
//! browser globals, so a [`VirtualDocument`] can stand in for a real page.

use crate::utils::scroll::ScrollMetrics;
use std::cell::{ Cell, RefCell };
use std::collections::{ BTreeMap, HashMap };
use std::fmt;
use std::rc::Rc;
use thiserror::Error;

/// Class on the root element that switches the stylesheet to dark mode
pub const DARK_CLASS: &str = "dark";
pub const HIDDEN_CLASS: &str = "hidden";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BindError {
    #[error("required element #{0} is missing from the document")]
    MissingElement(String),
}

/// A DOM element handle. Handles are shared, so mutation goes through `&self`.
pub trait Element {
    fn has_class(&self, class: &str) -> bool;
    fn add_class(&self, class: &str);
    fn remove_class(&self, class: &str);

    /// Returns whether the class is present afterwards.
    fn toggle_class(&self, class: &str) -> bool {
        if self.has_class(class) {
            self.remove_class(class);
            false
        } else {
            self.add_class(class);
            true
        }
    }

    fn style(&self, property: &str) -> Option<String>;
    fn set_style(&self, property: &str, value: &str);
}

pub trait Document {
    /// The `<html>` element
    fn root(&self) -> Rc<dyn Element>;
    fn element_by_id(&self, id: &str) -> Option<Rc<dyn Element>>;
    fn scroll_metrics(&self) -> ScrollMetrics;
}

/// Looks up an element the caller cannot work without.
pub fn require_element(document: &dyn Document, id: &str) -> Result<Rc<dyn Element>, BindError> {
    document.element_by_id(id).ok_or_else(|| BindError::MissingElement(id.to_string()))
}

/// The `prefers-color-scheme: dark` media query
pub trait ColorSchemePreference {
    fn prefers_dark(&self) -> bool;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StaticPreference {
    pub prefers_dark: bool,
}

impl StaticPreference {
    pub fn dark() -> Self {
        Self { prefers_dark: true }
    }

    pub fn light() -> Self {
        Self { prefers_dark: false }
    }
}

impl ColorSchemePreference for StaticPreference {
    fn prefers_dark(&self) -> bool {
        self.prefers_dark
    }
}

#[derive(Debug, Default)]
pub struct VirtualElement {
    classes: RefCell<Vec<String>>,
    styles: RefCell<BTreeMap<String, String>>,
}

impl VirtualElement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_classes(classes: &[&str]) -> Self {
        let element = Self::new();
        for class in classes {
            element.add_class(class);
        }
        element
    }

    /// Classes in insertion order, like `classList`
    pub fn classes(&self) -> Vec<String> {
        self.classes.borrow().clone()
    }
}

impl Element for VirtualElement {
    fn has_class(&self, class: &str) -> bool {
        self.classes.borrow().iter().any(|c| c == class)
    }

    fn add_class(&self, class: &str) {
        if !self.has_class(class) {
            self.classes.borrow_mut().push(class.to_string());
        }
    }

    fn remove_class(&self, class: &str) {
        self.classes.borrow_mut().retain(|c| c != class);
    }

    fn style(&self, property: &str) -> Option<String> {
        self.styles.borrow().get(property).cloned()
    }

    fn set_style(&self, property: &str, value: &str) {
        self.styles.borrow_mut().insert(property.to_string(), value.to_string());
    }
}

/// Renders the element's attributes, e.g. `class="dark" style="font-size: 18px"`.
impl fmt::Display for VirtualElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "class=\"{}\"", self.classes.borrow().join(" "))?;
        let styles = self.styles.borrow();
        if !styles.is_empty() {
            let declarations: Vec<String> = styles
                .iter()
                .map(|(property, value)| format!("{}: {}", property, value))
                .collect();
            write!(f, " style=\"{}\"", declarations.join("; "))?;
        }
        Ok(())
    }
}

/// In-memory page used by tests and the preview binary.
#[derive(Debug, Default)]
pub struct VirtualDocument {
    root: Rc<VirtualElement>,
    elements: RefCell<HashMap<String, Rc<VirtualElement>>>,
    scroll: Cell<ScrollMetrics>,
}

impl VirtualDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// A page carrying the blog header controls: both theme icons start hidden,
    /// as the templates ship them.
    pub fn with_blog_chrome() -> Self {
        let document = Self::new();
        document.insert_element(crate::libs::theme_toggle::THEME_TOGGLE_ID, VirtualElement::new());
        document.insert_element(
            crate::libs::theme_toggle::DARK_ICON_ID,
            VirtualElement::with_classes(&[HIDDEN_CLASS])
        );
        document.insert_element(
            crate::libs::theme_toggle::LIGHT_ICON_ID,
            VirtualElement::with_classes(&[HIDDEN_CLASS])
        );
        document.insert_element(
            crate::libs::font_size::FONT_SIZE_SWITCHER_ID,
            VirtualElement::new()
        );
        document
    }

    pub fn insert_element(&self, id: &str, element: VirtualElement) -> Rc<VirtualElement> {
        let element = Rc::new(element);
        self.elements.borrow_mut().insert(id.to_string(), Rc::clone(&element));
        element
    }

    pub fn remove_element(&self, id: &str) -> Option<Rc<VirtualElement>> {
        self.elements.borrow_mut().remove(id)
    }

    /// Typed access for inspecting state after a handler ran
    pub fn element(&self, id: &str) -> Option<Rc<VirtualElement>> {
        self.elements.borrow().get(id).cloned()
    }

    pub fn root_element(&self) -> Rc<VirtualElement> {
        Rc::clone(&self.root)
    }

    pub fn set_scroll_metrics(&self, metrics: ScrollMetrics) {
        self.scroll.set(metrics);
    }
}

impl Document for VirtualDocument {
    fn root(&self) -> Rc<dyn Element> {
        self.root_element()
    }

    fn element_by_id(&self, id: &str) -> Option<Rc<dyn Element>> {
        self.element(id).map(|element| element as Rc<dyn Element>)
    }

    fn scroll_metrics(&self) -> ScrollMetrics {
        self.scroll.get()
    }
}
