//! Attribute parsing for the model derives.

use syn::ext::IdentExt;
use syn::meta::ParseNestedMeta;
use syn::punctuated::Punctuated;
use syn::{Attribute, DeriveInput, Field, Fields, Ident, LitStr, Token, Type};

/// Struct-level options parsed from `#[model(...)]`.
#[derive(Debug, Default)]
pub(crate) struct ModelOptions {
    /// Collection path, e.g. `/users`.
    pub(crate) path: Option<LitStr>,
    /// Name of the identifier field, when not `id`.
    pub(crate) id: Option<Ident>,
    /// Method called after materialization.
    pub(crate) after_materialize: Option<Ident>,
}

impl ModelOptions {
    /// Parse every `#[model(...)]` attribute on the struct.
    pub(crate) fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut options = Self::default();

        for attr in attrs.iter().filter(|attr| attr.path().is_ident("model")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("path") {
                    options.path = Some(meta.value()?.parse()?);
                } else if meta.path.is_ident("id") {
                    let name: LitStr = meta.value()?.parse()?;
                    options.id = Some(name.parse()?);
                } else if meta.path.is_ident("after_materialize") {
                    let name: LitStr = meta.value()?.parse()?;
                    options.after_materialize = Some(name.parse()?);
                } else {
                    return Err(meta.error(
                        "unknown model option, expected `path`, `id` or `after_materialize`",
                    ));
                }
                Ok(())
            })?;
        }

        Ok(options)
    }
}

/// The identifier field of a struct.
pub(crate) struct IdField<'a> {
    /// Field name.
    pub(crate) ident: &'a Ident,
    /// `T` for both `T` and `Option<T>` fields.
    pub(crate) ty: &'a Type,
    /// Whether the field is an `Option<T>`.
    pub(crate) optional: bool,
}

fn named_fields(input: &DeriveInput) -> syn::Result<&Punctuated<Field, Token![,]>> {
    match &input.data {
        syn::Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => Ok(&fields.named),
            _ => Err(syn::Error::new_spanned(
                input,
                "models must be structs with named fields",
            )),
        },
        _ => Err(syn::Error::new_spanned(
            input,
            "models must be structs with named fields",
        )),
    }
}

/// Locate the identifier field.
///
/// Resolution order: a field marked `#[model(id)]`, the field named by the
/// struct option `id = "..."`, then a field called `id`.
pub(crate) fn find_id_field<'a>(
    input: &'a DeriveInput,
    options: &ModelOptions,
) -> syn::Result<IdField<'a>> {
    let fields = named_fields(input)?;

    let mut marked = None;
    for field in fields {
        if is_marked_id(field)? {
            if marked.is_some() {
                return Err(syn::Error::new_spanned(
                    field,
                    "only one field can be marked `#[model(id)]`",
                ));
            }
            marked = Some(field);
        }
    }

    let wanted = options
        .id
        .clone()
        .unwrap_or_else(|| Ident::new("id", proc_macro2::Span::call_site()));
    let field = marked
        .or_else(|| fields.iter().find(|f| f.ident.as_ref() == Some(&wanted)))
        .ok_or_else(|| {
            syn::Error::new_spanned(
                input,
                format!("no identifier field: add a `{wanted}` field or mark one with `#[model(id)]`"),
            )
        })?;

    let Some(ident) = field.ident.as_ref() else {
        return Err(syn::Error::new_spanned(field, "identifier field must be named"));
    };

    Ok(match option_inner(&field.ty) {
        Some(inner) => IdField {
            ident,
            ty: inner,
            optional: true,
        },
        None => IdField {
            ident,
            ty: &field.ty,
            optional: false,
        },
    })
}

fn is_marked_id(field: &Field) -> syn::Result<bool> {
    let mut marked = false;
    for attr in field.attrs.iter().filter(|attr| attr.path().is_ident("model")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("id") {
                marked = true;
                Ok(())
            } else {
                Err(meta.error("unknown field option, expected `id`"))
            }
        })?;
    }
    Ok(marked)
}

/// A field write responses can overwrite.
pub(crate) struct MergeField<'a> {
    pub(crate) ident: &'a Ident,
    pub(crate) ty: &'a Type,
    /// JSON key the field is read from.
    pub(crate) key: String,
}

/// Fields serde reads as a plain top-level key, with that key.
///
/// Fields marked `skip`, `skip_deserializing` or `flatten`, and fields with a
/// custom `with`/`deserialize_with` decoder, are left out: a merge never
/// touches them.
pub(crate) fn merge_fields(input: &DeriveInput) -> syn::Result<Vec<MergeField<'_>>> {
    let rename_all = struct_rename_rule(&input.attrs)?;
    let mut merged = Vec::new();

    for field in named_fields(input)? {
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let serde = SerdeField::parse(&field.attrs)?;
        if serde.excluded {
            continue;
        }
        let name = ident.unraw().to_string();
        let key = match (serde.rename, rename_all) {
            (Some(rename), _) => rename,
            (None, Some(rule)) => rule.apply(&name),
            (None, None) => name,
        };
        merged.push(MergeField {
            ident,
            ty: &field.ty,
            key,
        });
    }

    Ok(merged)
}

#[derive(Default)]
struct SerdeField {
    rename: Option<String>,
    excluded: bool,
}

impl SerdeField {
    fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut field = Self::default();
        for attr in attrs.iter().filter(|attr| attr.path().is_ident("serde")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") {
                    if let Some(name) = deserialize_name(&meta)? {
                        field.rename = Some(name);
                    }
                } else if ["skip", "skip_deserializing", "flatten"]
                    .iter()
                    .any(|name| meta.path.is_ident(name))
                {
                    field.excluded = true;
                } else if meta.path.is_ident("with") || meta.path.is_ident("deserialize_with") {
                    field.excluded = true;
                    skip_value(&meta)?;
                } else {
                    skip_value(&meta)?;
                }
                Ok(())
            })?;
        }
        Ok(field)
    }
}

/// Case conventions of `#[serde(rename_all = "...")]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RenameRule {
    Lower,
    Upper,
    Pascal,
    Camel,
    Snake,
    ScreamingSnake,
    Kebab,
    ScreamingKebab,
}

impl RenameRule {
    fn parse(rule: &LitStr) -> syn::Result<Self> {
        Ok(match rule.value().as_str() {
            "lowercase" => Self::Lower,
            "UPPERCASE" => Self::Upper,
            "PascalCase" => Self::Pascal,
            "camelCase" => Self::Camel,
            "snake_case" => Self::Snake,
            "SCREAMING_SNAKE_CASE" => Self::ScreamingSnake,
            "kebab-case" => Self::Kebab,
            "SCREAMING-KEBAB-CASE" => Self::ScreamingKebab,
            _ => return Err(syn::Error::new_spanned(rule, "unknown rename_all rule")),
        })
    }

    /// Rename a snake_case field name.
    pub(crate) fn apply(self, field: &str) -> String {
        match self {
            Self::Lower | Self::Snake => field.to_string(),
            Self::Upper | Self::ScreamingSnake => field.to_ascii_uppercase(),
            Self::Kebab => field.replace('_', "-"),
            Self::ScreamingKebab => field.to_ascii_uppercase().replace('_', "-"),
            Self::Pascal => field.split('_').map(capitalize).collect(),
            Self::Camel => {
                let pascal: String = field.split('_').map(capitalize).collect();
                let mut chars = pascal.chars();
                chars
                    .next()
                    .map(|first| first.to_ascii_lowercase().to_string() + chars.as_str())
                    .unwrap_or_default()
            }
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars
        .next()
        .map(|first| first.to_ascii_uppercase().to_string() + chars.as_str())
        .unwrap_or_default()
}

fn struct_rename_rule(attrs: &[Attribute]) -> syn::Result<Option<RenameRule>> {
    let mut rule = None;
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("serde")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename_all") {
                if meta.input.peek(Token![=]) {
                    rule = Some(RenameRule::parse(&meta.value()?.parse()?)?);
                } else {
                    meta.parse_nested_meta(|inner| {
                        if inner.path.is_ident("deserialize") {
                            rule = Some(RenameRule::parse(&inner.value()?.parse()?)?);
                        } else {
                            skip_value(&inner)?;
                        }
                        Ok(())
                    })?;
                }
            } else {
                skip_value(&meta)?;
            }
            Ok(())
        })?;
    }
    Ok(rule)
}

/// `rename = "x"` or the `deserialize` half of `rename(serialize = .., deserialize = ..)`.
fn deserialize_name(meta: &ParseNestedMeta<'_>) -> syn::Result<Option<String>> {
    if meta.input.peek(Token![=]) {
        let name: LitStr = meta.value()?.parse()?;
        return Ok(Some(name.value()));
    }
    let mut name = None;
    meta.parse_nested_meta(|inner| {
        if inner.path.is_ident("deserialize") {
            let value: LitStr = inner.value()?.parse()?;
            name = Some(value.value());
        } else {
            skip_value(&inner)?;
        }
        Ok(())
    })?;
    Ok(name)
}

/// Consume the value of a serde option rivet does not care about.
fn skip_value(meta: &ParseNestedMeta<'_>) -> syn::Result<()> {
    if meta.input.peek(Token![=]) {
        meta.value()?.parse::<syn::Expr>()?;
    } else if meta.input.peek(syn::token::Paren) {
        meta.parse_nested_meta(|inner| skip_value(&inner))?;
    }
    Ok(())
}

/// `Some(T)` when `ty` is `Option<T>`.
fn option_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    if segment.ident != "Option" {
        return None;
    }
    let syn::PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first()? {
        syn::GenericArgument::Type(inner) => Some(inner),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use quote::ToTokens;
    use syn::parse_quote;

    use super::*;

    #[test]
    fn parses_struct_options() {
        let input: DeriveInput = parse_quote! {
            #[model(path = "/users", after_materialize = "init")]
            struct User { id: u64 }
        };
        let options = ModelOptions::parse(&input.attrs).expect("valid options");

        assert_eq!(options.path.map(|p| p.value()).as_deref(), Some("/users"));
        assert_eq!(
            options.after_materialize.map(|i| i.to_string()).as_deref(),
            Some("init")
        );
        assert!(options.id.is_none());
    }

    #[test]
    fn rejects_unknown_option() {
        let input: DeriveInput = parse_quote! {
            #[model(table = "users")]
            struct User { id: u64 }
        };
        assert!(ModelOptions::parse(&input.attrs).is_err());
    }

    #[test]
    fn optional_id_unwraps_inner_type() {
        let input: DeriveInput = parse_quote! {
            struct User { id: Option<String>, name: String }
        };
        let field = find_id_field(&input, &ModelOptions::default()).expect("id field");

        assert!(field.optional);
        assert_eq!(field.ty.to_token_stream().to_string(), "String");
    }

    #[test]
    fn marked_field_wins() {
        let input: DeriveInput = parse_quote! {
            struct Account { id: u32, #[model(id)] uuid: String }
        };
        let field = find_id_field(&input, &ModelOptions::default()).expect("id field");

        assert_eq!(field.ident.to_string(), "uuid");
        assert!(!field.optional);
    }

    #[test]
    fn named_option_selects_field() {
        let input: DeriveInput = parse_quote! {
            #[model(id = "code")]
            struct Country { code: String }
        };
        let options = ModelOptions::parse(&input.attrs).expect("valid options");
        let field = find_id_field(&input, &options).expect("id field");

        assert_eq!(field.ident.to_string(), "code");
    }

    #[test]
    fn merge_keys_follow_serde_names() {
        let input: DeriveInput = parse_quote! {
            #[serde(rename_all = "camelCase")]
            struct User {
                id: Option<u64>,
                display_name: String,
                #[serde(rename = "mail")]
                email: String,
                #[serde(rename(serialize = "kind_out", deserialize = "kind_in"))]
                kind: String,
                #[serde(default, skip_serializing_if = "Option::is_none")]
                r#type: Option<String>,
            }
        };
        let keys: Vec<String> = merge_fields(&input)
            .expect("fields")
            .into_iter()
            .map(|field| field.key)
            .collect();

        assert_eq!(keys, ["id", "displayName", "mail", "kind_in", "type"]);
    }

    #[test]
    fn merge_leaves_out_fields_serde_does_not_read_directly() {
        let input: DeriveInput = parse_quote! {
            struct Order {
                id: u64,
                #[serde(skip)]
                total: u32,
                #[serde(skip_deserializing)]
                etag: String,
                #[serde(flatten)]
                extra: Extra,
                #[serde(with = "time::serde::rfc3339")]
                created_at: OffsetDateTime,
            }
        };
        let idents: Vec<String> = merge_fields(&input)
            .expect("fields")
            .into_iter()
            .map(|field| field.ident.to_string())
            .collect();

        assert_eq!(idents, ["id"]);
    }

    #[test]
    fn rename_rules() {
        assert_eq!(RenameRule::Pascal.apply("created_at"), "CreatedAt");
        assert_eq!(RenameRule::Camel.apply("created_at"), "createdAt");
        assert_eq!(RenameRule::ScreamingKebab.apply("created_at"), "CREATED-AT");
        assert_eq!(RenameRule::Kebab.apply("created_at"), "created-at");
    }

    #[test]
    fn missing_id_is_an_error() {
        let input: DeriveInput = parse_quote! {
            struct Note { text: String }
        };
        assert!(find_id_field(&input, &ModelOptions::default()).is_err());
    }
}
