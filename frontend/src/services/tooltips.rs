use wasm_bindgen::prelude::*;
use web_sys::Element;

use crate::services::logging::Logger;

const TOOLTIP_SELECTOR: &str = "[data-bs-toggle=\"tooltip\"]";

#[wasm_bindgen(js_namespace = bootstrap)]
extern "C" {
    type Tooltip;

    #[wasm_bindgen(static_method_of = Tooltip, js_name = getOrCreateInstance, catch)]
    fn get_or_create_instance(element: &Element) -> Result<Tooltip, JsValue>;
}

/// Makes sure every element asking for a Bootstrap tooltip has exactly one.
/// Safe to call after each render. Returns how many elements are bound;
/// pages without Bootstrap loaded get none.
pub fn init() -> u32 {
    let elements = match gloo::utils::document().query_selector_all(TOOLTIP_SELECTOR) {
        Ok(elements) => elements,
        Err(e) => {
            Logger::warn_with_component("tooltips", &format!("query failed: {:?}", e));
            return 0;
        }
    };

    let mut bound = 0;
    for i in 0..elements.length() {
        let Some(element) = elements.item(i).and_then(|node| node.dyn_into::<Element>().ok()) else {
            continue;
        };
        match Tooltip::get_or_create_instance(&element) {
            Ok(_) => bound += 1,
            Err(_) => {
                Logger::debug_with_component("tooltips", "bootstrap is not available");
                break;
            }
        }
    }
    bound
}

/// A stand-in `bootstrap` global for browser tests; it counts instances.
#[cfg(all(test, target_arch = "wasm32"))]
pub(crate) mod test_support {
    use wasm_bindgen::prelude::*;
    use web_sys::Element;

    #[wasm_bindgen(inline_js = "
        export function install_fake_bootstrap() {
            if (globalThis.bootstrap) { return; }
            const Tooltip = {
                created: 0,
                getOrCreateInstance(element) {
                    if (!element.__tooltip) {
                        element.__tooltip = {};
                        Tooltip.created += 1;
                    }
                    return element.__tooltip;
                },
            };
            globalThis.bootstrap = { Tooltip };
        }
        export function created_tooltips() { return globalThis.bootstrap.Tooltip.created; }
        export function has_tooltip(element) { return !!element.__tooltip; }
    ")]
    extern "C" {
        pub fn install_fake_bootstrap();
        pub fn created_tooltips() -> u32;
        pub fn has_tooltip(element: &Element) -> bool;
    }

    pub fn tooltip_element() -> Element {
        let document = gloo::utils::document();
        let element = document.create_element("button").unwrap();
        element.set_attribute("data-bs-toggle", "tooltip").unwrap();
        element.set_attribute("title", "Delete").unwrap();
        document.body().unwrap().append_child(&element).unwrap();
        element
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::test_support::*;
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_repeated_init_binds_each_element_once() {
        install_fake_bootstrap();
        let first = tooltip_element();
        let second = tooltip_element();

        let before = created_tooltips();
        let bound = init();
        assert!(has_tooltip(&first) && has_tooltip(&second));
        let created = created_tooltips();
        assert!(created >= before + 2);

        assert_eq!(init(), bound);
        assert_eq!(created_tooltips(), created);
    }
}
