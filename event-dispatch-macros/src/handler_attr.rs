use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::{Expr, Ident, Result, Token, parse::Parse, parse::ParseStream};

const PRIORITIES: [&str; 6] = ["Lowest", "Low", "Normal", "High", "Highest", "Monitor"];

/// `#[handler(...)]` 解析结果
pub(crate) struct HandlerOptions {
    pub(crate) priority: Ident,
    pub(crate) ignore_cancelled: bool,
}

impl HandlerOptions {
    pub(crate) fn from_attr(attr: &syn::Attribute) -> Result<Self> {
        let mut priority: Option<Ident> = None;
        let mut ignore_cancelled: Option<bool> = None;

        let pairs = match &attr.meta {
            syn::Meta::Path(_) => Punctuated::new(),
            syn::Meta::List(_) => {
                attr.parse_args_with(Punctuated::<HandlerKv, Token![,]>::parse_terminated)?
            }
            other => {
                return Err(syn::Error::new(
                    other.span(),
                    "expected #[handler] or #[handler(...)]",
                ));
            }
        };

        for kv in pairs {
            match kv.key.to_string().as_str() {
                "priority" => {
                    if priority.is_some() {
                        return Err(syn::Error::new(
                            kv.key.span(),
                            "duplicate key 'priority' in attribute",
                        ));
                    }
                    let Some(value) = kv.value else {
                        return Err(syn::Error::new(
                            kv.key.span(),
                            "expected 'priority = <Priority>'",
                        ));
                    };
                    priority = Some(parse_priority(&value)?);
                }
                "ignore_cancelled" => {
                    if ignore_cancelled.is_some() {
                        return Err(syn::Error::new(
                            kv.key.span(),
                            "duplicate key 'ignore_cancelled' in attribute",
                        ));
                    }
                    let flag = match kv.value {
                        None => true,
                        Some(Expr::Lit(syn::ExprLit {
                            lit: syn::Lit::Bool(b),
                            ..
                        })) => b.value,
                        Some(other) => {
                            return Err(syn::Error::new(
                                other.span(),
                                "expected boolean literal for 'ignore_cancelled'",
                            ));
                        }
                    };
                    ignore_cancelled = Some(flag);
                }
                _ => {
                    return Err(syn::Error::new(
                        kv.key.span(),
                        "unknown key; expected 'priority' | 'ignore_cancelled'",
                    ));
                }
            }
        }

        Ok(Self {
            priority: priority.unwrap_or_else(|| Ident::new("Normal", attr.span())),
            ignore_cancelled: ignore_cancelled.unwrap_or(false),
        })
    }

    pub(crate) fn priority_tokens(&self) -> TokenStream2 {
        let ident = &self.priority;
        quote! { ::event_dispatch::Priority::#ident }
    }
}

// 接受 `High`、`Priority::High` 或 `"HIGH"`，大小写不敏感
fn parse_priority(value: &Expr) -> Result<Ident> {
    let (name, span) = match value {
        Expr::Path(p) => match p.path.segments.last() {
            Some(seg) => (seg.ident.to_string(), seg.ident.span()),
            None => return Err(syn::Error::new(p.span(), "expected priority name")),
        },
        Expr::Lit(syn::ExprLit {
            lit: syn::Lit::Str(s),
            ..
        }) => (s.value(), s.span()),
        other => {
            return Err(syn::Error::new(
                other.span(),
                "expected priority name, e.g. High or \"HIGH\"",
            ));
        }
    };

    PRIORITIES
        .iter()
        .find(|p| p.eq_ignore_ascii_case(&name))
        .map(|p| Ident::new(p, span))
        .ok_or_else(|| {
            syn::Error::new(
                span,
                "unknown priority; expected Lowest | Low | Normal | High | Highest | Monitor",
            )
        })
}

struct HandlerKv {
    key: Ident,
    value: Option<Expr>,
}

impl Parse for HandlerKv {
    fn parse(input: ParseStream) -> Result<Self> {
        let key: Ident = input.parse()?;
        let value = if input.peek(Token![=]) {
            input.parse::<Token![=]>()?;
            Some(input.parse()?)
        } else {
            None
        };
        Ok(Self { key, value })
    }
}
