use gloo_events::EventListener;
use gloo_timers::callback::Timeout;
use log::debug;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, HtmlFormElement, HtmlInputElement, HtmlTextAreaElement};

use crate::components::contact_form::{
    ContactForm, FieldError, FieldInput, FieldKind, FormConfig, FormSurface, NOTICE_LIFETIME,
};
use crate::dom::listener::{cancelable, prevent};
use crate::dom::reveal::element_list;
use crate::dom::scheduler::Scheduled;
use crate::error::{SiteError, SiteResult};

const SLIDE_IN_MS: u32 = 100;
const SLIDE_OUT_MS: u32 = 300;
const ERROR_CLASS: &str = "error";
const ERROR_MESSAGE_CLASS: &str = "field-error";

#[derive(Clone)]
enum Field {
    Input(HtmlInputElement),
    TextArea(HtmlTextAreaElement),
}

impl Field {
    fn from_element(el: Element) -> Option<Self> {
        match el.dyn_into::<HtmlInputElement>() {
            Ok(input) => Some(Field::Input(input)),
            Err(el) => el.dyn_into::<HtmlTextAreaElement>().ok().map(Field::TextArea),
        }
    }

    fn element(&self) -> &Element {
        match self {
            Field::Input(input) => input.as_ref(),
            Field::TextArea(area) => area.as_ref(),
        }
    }

    fn read(&self) -> FieldInput {
        match self {
            Field::Input(input) => FieldInput {
                kind: FieldKind::from_input_type(&input.type_()),
                required: input.required(),
                value: input.value(),
            },
            Field::TextArea(area) => FieldInput {
                kind: FieldKind::Text,
                required: area.required(),
                value: area.value(),
            },
        }
    }
}

pub struct DomForm {
    document: Document,
    form: HtmlFormElement,
    fields: Vec<Field>,
    submit: Option<Element>,
}

impl DomForm {
    fn error_slot(&self, field: &Element) -> Option<Element> {
        let parent = field.parent_element()?;
        parent
            .query_selector(&format!(".{}", ERROR_MESSAGE_CLASS))
            .ok()
            .flatten()
    }
}

impl FormSurface for DomForm {
    fn fields(&self) -> Vec<FieldInput> {
        self.fields.iter().map(Field::read).collect()
    }

    fn mark_field(&mut self, index: usize, error: Option<&FieldError>) {
        let Some(field) = self.fields.get(index) else {
            return;
        };
        let el = field.element();
        let existing = self.error_slot(el);
        match error {
            Some(error) => {
                let _ = el.set_attribute("aria-invalid", "true");
                let _ = el.class_list().add_1(ERROR_CLASS);
                let slot = match existing {
                    Some(slot) => Some(slot),
                    None => self.document.create_element("div").ok().and_then(|div| {
                        div.set_class_name(ERROR_MESSAGE_CLASS);
                        let _ = div.set_attribute("role", "alert");
                        let parent = el.parent_element()?;
                        parent.append_child(&div).ok()?;
                        Some(div)
                    }),
                };
                if let Some(slot) = slot {
                    slot.set_text_content(Some(&error.to_string()));
                }
            }
            None => {
                let _ = el.remove_attribute("aria-invalid");
                let _ = el.class_list().remove_1(ERROR_CLASS);
                if let Some(slot) = existing {
                    slot.remove();
                }
            }
        }
    }

    fn submit_label(&self) -> String {
        self.submit
            .as_ref()
            .and_then(|button| button.text_content())
            .unwrap_or_default()
    }

    fn set_submit(&mut self, enabled: bool, label: &str) {
        let Some(button) = &self.submit else {
            return;
        };
        let _ = if enabled {
            button.remove_attribute("disabled")
        } else {
            button.set_attribute("disabled", "")
        };
        button.set_text_content(Some(label));
    }

    fn reset_form(&mut self) {
        self.form.reset();
    }

    fn notify(&mut self, message: &str) {
        let Some(body) = self.document.body() else {
            return;
        };
        let Some(toast) = self
            .document
            .create_element("div")
            .ok()
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        else {
            return;
        };
        toast.set_class_name("notification notification-success");
        let _ = toast.set_attribute("role", "status");
        toast.set_text_content(Some(message));
        let style = toast.style();
        for (name, value) in [
            ("position", "fixed"),
            ("top", "20px"),
            ("right", "20px"),
            ("max-width", "400px"),
            ("padding", "1rem 1.5rem"),
            ("border-radius", "8px"),
            ("background", "#10b981"),
            ("color", "#fff"),
            ("box-shadow", "0 10px 25px rgba(0, 0, 0, 0.15)"),
            ("z-index", "10000"),
            ("transform", "translateX(120%)"),
            ("transition", "transform 0.3s ease"),
        ] {
            let _ = style.set_property(name, value);
        }
        if body.append_child(&toast).is_err() {
            return;
        }

        let entering = toast.clone();
        Timeout::new(SLIDE_IN_MS, move || {
            let _ = entering.style().set_property("transform", "translateX(0)");
        })
        .forget();
        Timeout::new(NOTICE_LIFETIME.as_millis() as u32, move || {
            let _ = toast.style().set_property("transform", "translateX(120%)");
            Timeout::new(SLIDE_OUT_MS, move || toast.remove()).forget();
        })
        .forget();
    }
}

pub struct FormHandle {
    form: Scheduled<ContactForm<DomForm>>,
    listeners: Vec<EventListener>,
}

impl FormHandle {
    pub fn is_sending(&self) -> bool {
        self.form.read(|form| form.is_sending())
    }

    pub fn teardown(&mut self) {
        self.listeners.clear();
        self.form.cancel();
    }
}

/// Every contact form wired on the page.
pub struct ContactForms {
    forms: Vec<FormHandle>,
}

impl ContactForms {
    pub fn teardown(&mut self) {
        for form in &mut self.forms {
            form.teardown();
        }
    }
}

/// Wires every form matching the configured selector; `None` when there are none.
pub fn install(config: &FormConfig) -> SiteResult<Option<ContactForms>> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or(SiteError::NoWindow)?;

    let mut forms = Vec::new();
    for form in element_list(document.query_selector_all(&config.form_selector)?) {
        let Ok(form) = form.dyn_into::<HtmlFormElement>() else {
            continue;
        };
        forms.push(wire(&document, form, config)?);
    }
    if forms.is_empty() {
        return Ok(None);
    }
    debug!("{} contact forms wired", forms.len());
    Ok(Some(ContactForms { forms }))
}

fn wire(document: &Document, form: HtmlFormElement, config: &FormConfig) -> SiteResult<FormHandle> {
    let fields: Vec<Field> = element_list(form.query_selector_all(&config.field_selector)?)
        .into_iter()
        .filter_map(Field::from_element)
        .collect();
    let submit = form.query_selector(&config.submit_selector)?;

    let surface = DomForm {
        document: document.clone(),
        form: form.clone(),
        fields: fields.clone(),
        submit,
    };
    let controller = Scheduled::new(ContactForm::new(config.clone(), surface));
    let mut listeners = Vec::new();

    {
        let controller = controller.clone();
        listeners.push(cancelable(&form, "submit", move |event| {
            prevent(event);
            controller.with(|form, now| form.submit(now));
        }));
    }

    for (index, field) in fields.iter().enumerate() {
        let el = field.element();
        let on_blur = controller.clone();
        listeners.push(EventListener::new(el, "blur", move |_| {
            on_blur.with(|form, _| form.check_field(index));
        }));
        let on_input = controller.clone();
        listeners.push(EventListener::new(el, "input", move |_| {
            on_input.with(|form, _| form.clear_field(index));
        }));
    }

    Ok(FormHandle {
        form: controller,
        listeners,
    })
}
