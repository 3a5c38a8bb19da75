#![forbid(unsafe_code)]

//! `wasm-bindgen` exports.
//!
//! Wraps [`WatcherCore`] with JS-friendly types. Only compiled on `wasm32`
//! targets.

use std::rc::Rc;

use js_sys::{Object, Reflect};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use winsize_core::{Config, Host, ResizeObserver, Size, SizeKind, SizeSource};

use crate::browser::BrowserHost;
use crate::options::WatcherOptions;
use crate::registry;
use crate::watcher_core::WatcherCore;

fn console_error(msg: &str) {
    let global = js_sys::global();
    let Ok(console) = Reflect::get(&global, &"console".into()) else {
        return;
    };
    let Ok(error) = Reflect::get(&console, &"error".into()) else {
        return;
    };
    let Ok(error_fn) = error.dyn_into::<js_sys::Function>() else {
        return;
    };
    let _ = error_fn.call1(&console, &JsValue::from_str(msg));
}

fn install_panic_hook() {
    use std::sync::Once;

    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        std::panic::set_hook(Box::new(|info| {
            let msg = if let Some(loc) = info.location() {
                format!(
                    "panic at {}:{}:{}: {info}",
                    loc.file(),
                    loc.line(),
                    loc.column()
                )
            } else {
                format!("panic: {info}")
            };
            console_error(&msg);
        }));
    });
}

fn browser_observer() -> ResizeObserver {
    registry::shared_observer(|| Rc::new(BrowserHost::new()) as Rc<dyn Host>)
}

fn size_to_js(size: Size) -> JsValue {
    let obj = Object::new();
    let _ = Reflect::set(&obj, &"width".into(), &JsValue::from(size.width));
    let _ = Reflect::set(&obj, &"height".into(), &JsValue::from(size.height));
    obj.into()
}

/// Pull `{debounceTime, kind}` out of an arbitrary JS value. Fields of the
/// wrong type read as absent.
fn read_options(options: Option<&JsValue>) -> WatcherOptions {
    let Some(options) = options.filter(|v| v.is_object()) else {
        return WatcherOptions::default();
    };
    let field = |name: &str| Reflect::get(options, &JsValue::from_str(name)).ok();
    WatcherOptions {
        debounce_ms: field("debounceTime").and_then(|v| v.as_f64()),
        kind: field("kind").and_then(|v| v.as_string()),
    }
}

fn parse_config(options: Option<JsValue>) -> Result<Config, JsValue> {
    read_options(options.as_ref())
        .to_config()
        .map_err(|err| js_sys::Error::new(&err.to_string()).into())
}

/// Debounced window / visual viewport size watcher for JavaScript.
///
/// ```js
/// const watcher = new WindowSizeWatcher(({ width, height }) => {
///   console.log(width, height);
/// }, { debounceTime: 200, kind: "viewport" });
/// // ...
/// watcher.dispose();
/// ```
#[wasm_bindgen]
pub struct WindowSizeWatcher {
    inner: WatcherCore,
}

#[wasm_bindgen(start)]
pub fn wasm_start() {
    install_panic_hook();
}

#[wasm_bindgen]
impl WindowSizeWatcher {
    /// Start watching. `onChange` receives `{width, height}` immediately and
    /// after every debounced change.
    #[wasm_bindgen(constructor)]
    pub fn new(
        on_change: Option<js_sys::Function>,
        options: Option<JsValue>,
    ) -> Result<WindowSizeWatcher, JsValue> {
        install_panic_hook();
        let config = parse_config(options)?;
        let callback = on_change.map(|f| {
            Rc::new(move |size: Size| {
                if let Err(err) = f.call1(&JsValue::NULL, &size_to_js(size)) {
                    console_error(&format!("WindowSizeWatcher onChange threw: {err:?}"));
                }
            }) as Rc<dyn Fn(Size)>
        });
        let observer = browser_observer();
        Ok(Self {
            inner: WatcherCore::new(&observer, config, callback),
        })
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.inner.size().width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.inner.size().height
    }

    /// Number of size changes seen since construction.
    #[wasm_bindgen(getter)]
    pub fn version(&self) -> f64 {
        self.inner.version() as f64
    }

    #[wasm_bindgen(getter, js_name = debounceTime)]
    pub fn debounce_time(&self) -> f64 {
        self.inner.config().debounce.as_micros() as f64 / 1000.0
    }

    #[wasm_bindgen(getter)]
    pub fn kind(&self) -> String {
        self.inner.config().kind.as_str().to_owned()
    }

    #[wasm_bindgen(js_name = isActive)]
    pub fn is_active(&self) -> bool {
        self.inner.is_active()
    }

    /// Stop watching. Idempotent; the last size stays readable.
    pub fn dispose(&mut self) {
        if self.inner.dispose() {
            registry::release_if_idle();
        }
    }
}

impl Drop for WindowSizeWatcher {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Read the current size without subscribing. `kind` defaults to
/// `"window"`.
#[wasm_bindgen(js_name = readSize)]
pub fn read_size(kind: Option<String>) -> Result<JsValue, JsValue> {
    let kind = match kind {
        Some(name) => name
            .parse::<SizeKind>()
            .map_err(|err| JsValue::from(js_sys::Error::new(&err.to_string())))?,
        None => SizeKind::default(),
    };
    let host = BrowserHost::new();
    let size = SizeSource::from_host(&host).read(kind);
    Ok(size_to_js(size))
}
