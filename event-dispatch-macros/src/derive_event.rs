use proc_macro::TokenStream;
use quote::quote;
use syn::spanned::Spanned;
use syn::{Data, DeriveInput, Fields, Ident, Result, parse_macro_input};

pub(crate) fn expand_event(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let cancelable = match parse_event_attrs(&input) {
        Ok(v) => v,
        Err(err) => return err.to_compile_error().into(),
    };

    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let body = if cancelable {
        quote! {
            fn as_cancelable(&self) -> ::core::option::Option<&dyn ::event_dispatch::Cancelable> {
                ::core::option::Option::Some(self)
            }
        }
    } else {
        quote! {}
    };

    let out = quote! {
        impl #impl_generics ::event_dispatch::Event for #ident #ty_generics #where_clause {
            #body
        }
    };

    TokenStream::from(out)
}

// 解析 `#[event(cancelable)]`
fn parse_event_attrs(input: &DeriveInput) -> Result<bool> {
    let mut cancelable = false;

    for attr in input.attrs.iter().filter(|a| a.path().is_ident("event")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("cancelable") {
                if cancelable {
                    return Err(meta.error("duplicate key 'cancelable' in attribute"));
                }
                cancelable = true;
                Ok(())
            } else {
                Err(meta.error("unknown key; expected 'cancelable'"))
            }
        })?;
    }

    Ok(cancelable)
}

pub(crate) fn expand_cancelable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let field = match cancelled_field(&input) {
        Ok(f) => f,
        Err(err) => return err.to_compile_error().into(),
    };

    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let out = quote! {
        impl #impl_generics ::event_dispatch::Cancelable for #ident #ty_generics #where_clause {
            fn set_cancelled(&mut self, cancelled: bool) {
                self.#field = cancelled;
            }

            fn is_cancelled(&self) -> bool {
                self.#field
            }
        }
    };

    TokenStream::from(out)
}

// 优先使用 `#[cancelled]` 标记的字段，否则使用名为 `cancelled` 的字段
fn cancelled_field(input: &DeriveInput) -> Result<Ident> {
    let fields = match &input.data {
        Data::Struct(s) => match &s.fields {
            Fields::Named(named) => named,
            _ => {
                return Err(syn::Error::new(
                    input.span(),
                    "#[derive(Cancelable)] supports only named-field structs",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new(
                input.span(),
                "#[derive(Cancelable)] can only be used on structs",
            ));
        }
    };

    let mut tagged = fields
        .named
        .iter()
        .filter(|f| f.attrs.iter().any(|a| a.path().is_ident("cancelled")));

    if let Some(first) = tagged.next() {
        if let Some(second) = tagged.next() {
            return Err(syn::Error::new(
                second.span(),
                "only one field may be marked #[cancelled]",
            ));
        }
        return first
            .ident
            .clone()
            .ok_or_else(|| syn::Error::new(first.span(), "expected named field"));
    }

    fields
        .named
        .iter()
        .filter_map(|f| f.ident.clone())
        .find(|i| i == "cancelled")
        .ok_or_else(|| {
            syn::Error::new(
                input.span(),
                "no cancellation flag found; add a `cancelled: bool` field or mark one with #[cancelled]",
            )
        })
}
