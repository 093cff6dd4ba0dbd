use darling::{
    FromDeriveInput, FromField, FromMeta,
    util::{Flag, Ignored},
};
use proc_macro::TokenStream;
use quote::{format_ident, quote, quote_spanned};
use syn::{DeriveInput, Ident, Type, parse_macro_input, spanned::Spanned};

use crate::utils::reject_generics;

#[derive(FromDeriveInput)]
#[darling(attributes(request), supports(struct_named))]
struct RequestShapeInput {
    data: darling::ast::Data<Ignored, ShapeField>,
    generics: syn::Generics,
    ident: syn::Ident,
    /// `#[request(validate)]`
    #[darling(default)]
    validate: Flag,
    /// `#[request(on_bind_error)]`
    #[darling(default)]
    on_bind_error: Flag,
}

struct ShapeField {
    ident: Ident,
    ty: Type,
    region: Option<Region>,
}

struct Region {
    kind: RegionKind,
    validate: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum RegionKind {
    Body,
    Path,
    Query,
    Context,
}

// Nested meta for `#[bind(<region>, validate)]`
#[derive(Default, FromMeta)]
#[darling(default)]
struct BindAttr {
    body: Flag,
    path: Flag,
    query: Flag,
    context: Flag,
    validate: Flag,
}

impl FromField for ShapeField {
    fn from_field(field: &syn::Field) -> darling::Result<Self> {
        let ident = field
            .ident
            .clone()
            .ok_or_else(|| darling::Error::unsupported_shape("unnamed fields").with_span(field))?;

        let mut bind_attrs = field.attrs.iter().filter(|a| a.path().is_ident("bind"));
        let Some(attr) = bind_attrs.next() else {
            return Ok(Self {
                ident,
                ty: field.ty.clone(),
                region: None,
            });
        };
        if let Some(duplicate) = bind_attrs.next() {
            return Err(darling::Error::custom(format!(
                "Field `{ident}` can't be annotated with `#[bind(..)]` more than once.\n\
                 help: Merge the annotations into a single `#[bind(..)]` attribute.",
            ))
            .with_span(duplicate.path()));
        }
        if attr.meta.require_list().is_err() {
            return Err(darling::Error::custom(format!(
                "You must specify the region that field `{ident}` is bound from.\n\
                 Use one of the following: #[bind(body)], #[bind(path)], #[bind(query)] or #[bind(context)].",
            ))
            .with_span(attr.path()));
        }

        let parsed = BindAttr::from_meta(&attr.meta)?;
        let mut kinds = Vec::new();
        for (flag, kind) in [
            (&parsed.body, RegionKind::Body),
            (&parsed.path, RegionKind::Path),
            (&parsed.query, RegionKind::Query),
            (&parsed.context, RegionKind::Context),
        ] {
            if flag.is_present() {
                kinds.push(kind);
            }
        }
        let kind = match kinds.as_slice() {
            [kind] => *kind,
            [] => {
                return Err(darling::Error::custom(format!(
                    "You must specify the region that field `{ident}` is bound from.\n\
                     Use one of `body`, `path`, `query` or `context`, e.g. `#[bind(path)]`.",
                ))
                .with_span(attr.path()));
            }
            _ => {
                let regions = kinds
                    .iter()
                    .map(|k| format!("`{}`", k.as_str()))
                    .collect::<Vec<_>>()
                    .join(", ");
                return Err(darling::Error::custom(format!(
                    "Field `{ident}` is bound from multiple regions: {regions}.\n\
                     help: A field belongs to exactly **one** region.",
                ))
                .with_span(&ident));
            }
        };

        Ok(Self {
            ident,
            ty: field.ty.clone(),
            region: Some(Region {
                kind,
                validate: parsed.validate.is_present(),
            }),
        })
    }
}

impl RegionKind {
    fn as_str(&self) -> &'static str {
        match self {
            RegionKind::Body => "body",
            RegionKind::Path => "path",
            RegionKind::Query => "query",
            RegionKind::Context => "context",
        }
    }

    fn variant(&self) -> Ident {
        match self {
            RegionKind::Body => format_ident!("Body"),
            RegionKind::Path => format_ident!("Path"),
            RegionKind::Query => format_ident!("Query"),
            RegionKind::Context => format_ident!("Context"),
        }
    }
}

pub(super) fn derive_request_shape(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match _derive_request_shape(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.write_errors().into(),
    }
}

fn _derive_request_shape(input: DeriveInput) -> Result<proc_macro2::TokenStream, darling::Error> {
    let input = RequestShapeInput::from_derive_input(&input)?;
    reject_generics("RequestShape", &input.ident, &input.generics)?;

    let struct_ident = &input.ident;
    let Some(fields) = input.data.take_struct() else {
        return Err(darling::Error::unsupported_shape("enum").with_span(struct_ident));
    };

    let plan_ident = format_ident!("__plan");
    let inputs_ident = format_ident!("__inputs");

    let mut region_decls = Vec::new();
    let mut validators = Vec::new();
    for field in fields.iter() {
        let Some(region) = &field.region else {
            continue;
        };
        let field_ident = &field.ident;
        let field_name = field_ident.to_string();
        let ty = &field.ty;
        let ty_span = ty.span();
        let constructor = format_ident!("{}", region.kind.as_str());
        let validated = region.validate.then(|| {
            let validator_ident = format_ident!("__validate_{}", field_ident);
            validators.push(quote_spanned! { ty_span =>
                fn #validator_ident(
                    shape: &#struct_ident,
                    ctx: &mut ::reqbind::pipeline::Context<'_>,
                ) -> ::core::result::Result<(), ::reqbind::Error> {
                    ::reqbind::pipeline::Validate::validate(&shape.#field_ident, ctx)
                }
            });
            quote! { .validated(#validator_ident) }
        });
        region_decls.push(quote_spanned! { ty_span =>
            .region(::reqbind::reflect::RegionDecl::#constructor::<#ty>(#field_name) #validated)
        });
    }
    let whole_validator = input.validate.is_present().then(|| {
        quote! { .validated(<#struct_ident as ::reqbind::pipeline::Validate>::validate) }
    });
    let bind_error_hook = input.on_bind_error.is_present().then(|| {
        quote! { .on_bind_error(<#struct_ident as ::reqbind::pipeline::OnBindError>::on_bind_error) }
    });

    // Regions are bound in a fixed order, regardless of the order of the fields.
    let mut bound: Vec<&ShapeField> = fields.iter().filter(|f| f.region.is_some()).collect();
    bound.sort_by_key(|f| f.region.as_ref().map(|r| r.kind));
    let bindings = bound.iter().filter_map(|field| {
        let region = field.region.as_ref()?;
        let field_ident = &field.ident;
        let field_name = field_ident.to_string();
        let ty = &field.ty;
        let ty_span = ty.span();
        let binding = match region.kind {
            RegionKind::Body => quote_spanned! { ty_span =>
                ::reqbind::bind::body::<#ty, Self>(#plan_ident, #field_name, #inputs_ident)?
            },
            kind => {
                let variant = kind.variant();
                quote_spanned! { ty_span =>
                    ::reqbind::bind::params::<#ty, Self>(
                        #plan_ident,
                        ::reqbind::reflect::RegionKind::#variant,
                        #field_name,
                        #inputs_ident,
                    )?
                }
            }
        };
        Some(quote! { let #field_ident: #ty = #binding; })
    });

    let field_assignments = fields.iter().map(|field| {
        let field_ident = &field.ident;
        if field.region.is_some() {
            quote! { #field_ident }
        } else {
            quote_spanned! { field.ty.span() =>
                #field_ident: ::core::default::Default::default()
            }
        }
    });

    Ok(quote! {
        #[automatically_derived]
        impl ::reqbind::reflect::RequestShape for #struct_ident {
            fn declare() -> ::reqbind::reflect::ShapeDecl<Self> {
                #(#validators)*

                ::reqbind::reflect::ShapeDecl::new()
                    #(#region_decls)*
                    #whole_validator
                    #bind_error_hook
            }

            #[allow(unused_variables)]
            fn bind(
                #plan_ident: &::reqbind::reflect::BindingPlan<Self>,
                #inputs_ident: &mut ::reqbind::bind::Inputs<'_>,
            ) -> ::core::result::Result<Self, ::reqbind::bind::BindError> {
                #(#bindings)*
                ::core::result::Result::Ok(Self {
                    #(#field_assignments),*
                })
            }
        }
    })
}
