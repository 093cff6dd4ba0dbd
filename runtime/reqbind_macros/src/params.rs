use darling::{FromDeriveInput, FromField, ast::NestedMeta, util::Ignored};
use proc_macro::TokenStream;
use quote::{format_ident, quote, quote_spanned};
use syn::{DeriveInput, Ident, LitStr, Type, parse_macro_input, spanned::Spanned};

use crate::utils::reject_generics;

#[derive(FromDeriveInput)]
#[darling(supports(struct_named))]
struct ParamsInput {
    data: darling::ast::Data<Ignored, ParamField>,
    generics: syn::Generics,
    ident: syn::Ident,
}

struct ParamField {
    ident: Ident,
    ty: Type,
    /// The raw binding tag, `None` if the field isn't a parameter.
    tag: Option<LitStr>,
    /// Set by `#[param(.., typed)]`: the value is cloned out of the context as it is.
    typed: bool,
}

impl FromField for ParamField {
    fn from_field(field: &syn::Field) -> darling::Result<Self> {
        let ident = field
            .ident
            .clone()
            .ok_or_else(|| darling::Error::unsupported_shape("unnamed fields").with_span(field))?;

        let mut param_attrs = field.attrs.iter().filter(|a| a.path().is_ident("param"));
        let Some(attr) = param_attrs.next() else {
            return Ok(Self {
                ident,
                ty: field.ty.clone(),
                tag: None,
                typed: false,
            });
        };
        if let Some(duplicate) = param_attrs.next() {
            return Err(darling::Error::custom(format!(
                "Field `{ident}` can't be annotated with `#[param]` more than once.",
            ))
            .with_span(duplicate.path()));
        }

        let (tag, typed) = match &attr.meta {
            // `#[param]` selects all the defaults.
            syn::Meta::Path(path) => (LitStr::new("", path.span()), false),
            syn::Meta::List(list) => parse_param_list(attr, list)?,
            syn::Meta::NameValue(_) => {
                return Err(darling::Error::custom(
                    "Pass the binding tag between parentheses.\n\
                     For example, `#[param(\"id,optional\")]`.",
                )
                .with_span(attr.path()));
            }
        };
        Ok(Self {
            ident,
            ty: field.ty.clone(),
            tag: Some(tag),
            typed,
        })
    }
}

/// Parse `#[param("<tag>")]`, `#[param("<tag>", typed)]` or `#[param(typed)]`.
fn parse_param_list(attr: &syn::Attribute, list: &syn::MetaList) -> darling::Result<(LitStr, bool)> {
    let invalid = || {
        darling::Error::custom(
            "The binding tag must be a single string literal, optionally followed by `typed`.\n\
             For example, `#[param(\"id,optional,desc=The todo identifier\")]`.",
        )
        .with_span(attr.path())
    };
    let items = NestedMeta::parse_meta_list(list.tokens.clone()).map_err(|_| invalid())?;
    let mut tag = None;
    let mut typed = false;
    for item in items {
        match item {
            NestedMeta::Lit(syn::Lit::Str(lit)) if tag.is_none() => tag = Some(lit),
            NestedMeta::Meta(syn::Meta::Path(path)) if path.is_ident("typed") && !typed => typed = true,
            _ => return Err(invalid()),
        }
    }
    let tag = tag.unwrap_or_else(|| LitStr::new("", list.span()));
    Ok((tag, typed))
}

/// The `T` in `Option<T>`, as far as it can be told from the syntax alone.
fn option_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    if path.qself.is_some() {
        return None;
    }
    let segment = path.path.segments.last()?;
    if segment.ident != "Option" {
        return None;
    }
    let syn::PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first() {
        Some(syn::GenericArgument::Type(inner)) if args.args.len() == 1 => Some(inner),
        _ => None,
    }
}

pub(super) fn derive_params(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match _derive_params(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.write_errors().into(),
    }
}

fn _derive_params(input: DeriveInput) -> Result<proc_macro2::TokenStream, darling::Error> {
    let input = ParamsInput::from_derive_input(&input)?;
    reject_generics("Params", &input.ident, &input.generics)?;

    let struct_ident = &input.ident;
    let Some(fields) = input.data.take_struct() else {
        return Err(darling::Error::unsupported_shape("enum").with_span(struct_ident));
    };

    let cursor_ident = format_ident!("__cursor");
    let binder_ident = format_ident!("__binder");
    let declarations = fields.iter().filter_map(|field| {
        let tag = field.tag.as_ref()?;
        let field_name = field.ident.to_string();
        let ty = &field.ty;
        let declaration = match (field.typed, option_inner(ty)) {
            (false, _) => quote_spanned! { ty.span() =>
                ::reqbind::reflect::ParamDecl::new::<#ty>(#field_name, #tag)
            },
            (true, None) => quote_spanned! { ty.span() =>
                ::reqbind::reflect::ParamDecl::typed::<#ty>(#field_name, #tag)
            },
            (true, Some(inner)) => quote_spanned! { ty.span() =>
                ::reqbind::reflect::ParamDecl::typed::<#inner>(#field_name, #tag).nullable()
            },
        };
        Some(declaration)
    });
    let field_assignments = fields.iter().map(|field| {
        let field_ident = &field.ident;
        let field_name = field_ident.to_string();
        let ty = &field.ty;
        if field.tag.is_none() {
            return quote_spanned! { ty.span() =>
                #field_ident: ::core::default::Default::default()
            };
        }
        if !field.typed {
            quote_spanned! { ty.span() =>
                #field_ident: ::reqbind::bind::param::<#ty, _>(&mut #cursor_ident, #field_name, #binder_ident)?
            }
        } else if let Some(inner) = option_inner(ty) {
            quote_spanned! { ty.span() =>
                #field_ident: ::reqbind::bind::optional_typed_param::<#inner, _>(&mut #cursor_ident, #field_name, #binder_ident)?
            }
        } else {
            quote_spanned! { ty.span() =>
                #field_ident: ::reqbind::bind::typed_param::<#ty, _>(&mut #cursor_ident, #field_name, #binder_ident)?
            }
        }
    });

    Ok(quote! {
        #[automatically_derived]
        impl ::reqbind::bind::Params for #struct_ident {
            fn declare() -> ::std::vec::Vec<::reqbind::reflect::ParamDecl> {
                ::std::vec![#(#declarations),*]
            }

            #[allow(unused_mut, unused_variables)]
            fn bind<__B: ::reqbind::bind::ParamBinder>(
                __params: &[::reqbind::reflect::ParamDescriptor],
                #binder_ident: &__B,
            ) -> ::core::result::Result<Self, ::reqbind::bind::BindError> {
                let mut #cursor_ident = ::reqbind::bind::ParamCursor::new(
                    ::core::any::type_name::<Self>(),
                    __params,
                );
                ::core::result::Result::Ok(Self {
                    #(#field_assignments),*
                })
            }
        }
    })
}
