use proc_macro::TokenStream;

mod derive_event;
mod handler_attr;
mod listener;

/// 监听器宏
/// - 作用于 inherent impl 块，收集其中带 `#[handler]` 的方法
/// - 自动为目标类型实现 `::event_dispatch::Listener`（`declare_handlers`）
/// - 方法形状：`fn(&self, event: &mut E)` 或 `fn(&self, event: &E)`，
///   可无返回值或返回 `Result<(), _>`；不合规的方法在注册时上报并跳过
/// - 支持参数：`#[handler(priority = High, ignore_cancelled)]`，默认 `Normal` / `false`
#[proc_macro_attribute]
pub fn listener(attr: TokenStream, item: TokenStream) -> TokenStream {
    listener::expand(attr, item)
}

/// 处理器标记，仅在 `#[listener]` impl 块内有效（由 `#[listener]` 消费）
#[proc_macro_attribute]
pub fn handler(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let mut out = TokenStream::from(
        syn::Error::new(
            proc_macro2::Span::call_site(),
            "#[handler] can only be used on methods inside a #[listener] impl block",
        )
        .to_compile_error(),
    );
    out.extend(item);
    out
}

/// 为事件类型实现 `::event_dispatch::Event`
/// - `#[event(cancelable)]`：通过 `as_cancelable` 暴露 `Cancelable` 能力（需同时实现 `Cancelable`）
#[proc_macro_derive(Event, attributes(event))]
pub fn derive_event(input: TokenStream) -> TokenStream {
    derive_event::expand_event(input)
}

/// 为具名字段结构体实现 `::event_dispatch::Cancelable`
/// - 使用带 `#[cancelled]` 标记的字段，缺省使用名为 `cancelled` 的字段（类型为 `bool`）
#[proc_macro_derive(Cancelable, attributes(cancelled))]
pub fn derive_cancelable(input: TokenStream) -> TokenStream {
    derive_event::expand_cancelable(input)
}
