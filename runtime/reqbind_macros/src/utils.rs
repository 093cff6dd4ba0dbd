/// Generated implementations are not generic: reject type parameters and lifetimes upfront.
pub(crate) fn reject_generics(
    derive: &str,
    ident: &syn::Ident,
    generics: &syn::Generics,
) -> Result<(), darling::Error> {
    if let Some(generic) = generics.type_params().next() {
        return Err(darling::Error::custom(format!(
            "`#[derive({derive})]` can't be applied to types with generic type parameters, such as `{ident}`.\n\
            help: Consider using concrete types instead. Alternatively, implement the trait manually.",
        ))
        .with_span(&generic.ident));
    }
    if let Some(lifetime) = generics.lifetimes().next() {
        return Err(darling::Error::custom(format!(
            "`#[derive({derive})]` can't be applied to types with generic lifetimes, such as `{ident}`.\n\
            help: Use owned types for the fields of `{ident}`.",
        ))
        .with_span(&lifetime.lifetime.ident));
    }
    Ok(())
}
