use crate::handler_attr::HandlerOptions;
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::spanned::Spanned;
use syn::{FnArg, ImplItem, ItemImpl, ReturnType, Signature, Type, parse_macro_input};

/// #[listener] 宏实现
/// - 仅支持 inherent impl 块
/// - 逐个方法移除 `#[handler]` 标记，按声明顺序生成处理器声明
/// - 形状不合规的方法不会报编译错误，而是生成 `Handlers::reject`，
///   由注册流程上报并跳过，其余处理器照常注册
pub(crate) fn expand(attr: TokenStream, item: TokenStream) -> TokenStream {
    if !attr.is_empty() {
        return syn::Error::new(
            TokenStream2::from(attr).span(),
            "#[listener] does not take arguments",
        )
        .to_compile_error()
        .into();
    }

    let mut item_impl = parse_macro_input!(item as ItemImpl);

    if let Some((_, path, _)) = &item_impl.trait_ {
        return syn::Error::new(
            path.span(),
            "#[listener] must be applied to an inherent impl block",
        )
        .to_compile_error()
        .into();
    }

    let mut declarations: Vec<TokenStream2> = Vec::new();

    for impl_item in item_impl.items.iter_mut() {
        let ImplItem::Fn(method) = impl_item else {
            continue;
        };

        let mut handler_attr = None;
        let mut retained_attrs = Vec::new();
        for attr in method.attrs.drain(..) {
            if attr.path().is_ident("handler") {
                if handler_attr.is_some() {
                    return syn::Error::new(attr.span(), "duplicate #[handler] on method")
                        .to_compile_error()
                        .into();
                }
                handler_attr = Some(attr);
            } else {
                retained_attrs.push(attr);
            }
        }
        method.attrs = retained_attrs;

        let Some(attr) = handler_attr else {
            continue;
        };

        let options = match HandlerOptions::from_attr(&attr) {
            Ok(options) => options,
            Err(err) => return err.to_compile_error().into(),
        };

        let ident = &method.sig.ident;
        let name = ident.to_string();

        match event_type(&method.sig) {
            Ok(event_ty) => {
                let priority = options.priority_tokens();
                let ignore_cancelled = options.ignore_cancelled;
                declarations.push(quote! {
                    handlers.on_named::<#event_ty, _, _>(
                        #name,
                        #priority,
                        #ignore_cancelled,
                        |listener: &Self, event: &mut #event_ty| Self::#ident(listener, event),
                    );
                });
            }
            Err(reason) => {
                declarations.push(quote! {
                    handlers.reject(#name, #reason);
                });
            }
        }
    }

    let self_ty = &item_impl.self_ty;
    let (impl_generics, _, where_clause) = item_impl.generics.split_for_impl();

    let out = quote! {
        #item_impl

        impl #impl_generics ::event_dispatch::Listener for #self_ty #where_clause {
            #[allow(unused_variables)]
            fn declare_handlers(&self, handlers: &mut ::event_dispatch::Handlers<Self>) {
                #( #declarations )*
            }
        }
    };

    TokenStream::from(out)
}

// 校验处理器形状并取出事件类型；不合规时返回原因
fn event_type(sig: &Signature) -> Result<Type, String> {
    if sig.asyncness.is_some() {
        return Err("async handlers are not supported".to_string());
    }
    if !sig.generics.params.is_empty() {
        return Err("generic handlers are not supported".to_string());
    }

    let mut inputs = sig.inputs.iter();
    match inputs.next() {
        Some(FnArg::Receiver(r)) => {
            if !matches!(&*r.ty, Type::Reference(t) if t.mutability.is_none()) {
                return Err("handler receiver must be &self".to_string());
            }
        }
        _ => return Err("handler must take &self".to_string()),
    }

    let params: Vec<&FnArg> = inputs.collect();
    if params.len() != 1 {
        return Err(format!(
            "expected exactly one event parameter, found {}",
            params.len()
        ));
    }

    let event_ty = match params[0] {
        FnArg::Typed(pat) => match &*pat.ty {
            Type::Reference(r) if !matches!(&*r.elem, Type::ImplTrait(_) | Type::Infer(_)) => {
                (*r.elem).clone()
            }
            _ => return Err("event parameter must be &E or &mut E".to_string()),
        },
        FnArg::Receiver(_) => return Err("handler must take &self".to_string()),
    };

    if !returns_unit_or_result(&sig.output) {
        return Err("handler must not return a value".to_string());
    }

    Ok(event_ty)
}

// 允许：无返回值、`()`、`Result<(), _>`、`HandlerResult`
fn returns_unit_or_result(output: &ReturnType) -> bool {
    let ty = match output {
        ReturnType::Default => return true,
        ReturnType::Type(_, ty) => ty,
    };

    match &**ty {
        Type::Tuple(t) => t.elems.is_empty(),
        Type::Path(p) => {
            let Some(last) = p.path.segments.last() else {
                return false;
            };
            if last.ident == "HandlerResult" {
                return last.arguments.is_none();
            }
            if last.ident != "Result" {
                return false;
            }
            match &last.arguments {
                syn::PathArguments::AngleBracketed(args) => matches!(
                    args.args.first(),
                    Some(syn::GenericArgument::Type(Type::Tuple(t))) if t.elems.is_empty()
                ),
                _ => false,
            }
        }
        _ => false,
    }
}
