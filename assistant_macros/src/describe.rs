//! `#[derive(Describe)]`

use proc_macro2::TokenStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::meta::ParseNestedMeta;
use syn::{
    parse_quote, Attribute, Data, DeriveInput, Expr, ExprLit, ExprUnary, Field, Fields, Lit,
    LitStr, Meta, UnOp,
};

/// Tag names accepted in `#[schema(...)]` on fields, with snake_case aliases
const FIELD_TAGS: &[(&str, &str)] = &[
    ("description", "description"),
    ("title", "title"),
    ("format", "format"),
    ("encoding", "encoding"),
    ("pattern", "pattern"),
    ("enum", "enum"),
    ("example", "example"),
    ("required", "required"),
    ("multipleOf", "multiple_of"),
    ("maximum", "maximum"),
    ("exclusiveMaximum", "exclusive_maximum"),
    ("minimum", "minimum"),
    ("exclusiveMinimum", "exclusive_minimum"),
    ("minLength", "min_length"),
    ("maxLength", "max_length"),
    ("minItems", "min_items"),
    ("maxItems", "max_items"),
    ("uniqueItems", "unique_items"),
    ("minProperties", "min_properties"),
    ("maxProperties", "max_properties"),
];

pub(crate) fn expand(input: DeriveInput) -> syn::Result<TokenStream> {
    let container = ContainerAttrs::parse(&input.attrs)?;
    let body = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) if container.transparent => match fields.named.first() {
                Some(field) if fields.named.len() == 1 => transparent(field),
                _ => {
                    return Err(syn::Error::new_spanned(
                        &input.ident,
                        "transparent structs must have exactly one field",
                    ))
                }
            },
            Fields::Named(fields) => record(&input, &container, fields.named.iter())?,
            Fields::Unnamed(fields) if fields.unnamed.len() == 1 => {
                transparent(&fields.unnamed[0])
            }
            Fields::Unnamed(_) => unsupported("tuple struct"),
            Fields::Unit => unsupported("unit struct"),
        },
        Data::Enum(_) => unsupported("enum"),
        Data::Union(data) => {
            return Err(syn::Error::new_spanned(
                data.union_token,
                "Describe cannot be derived for unions",
            ))
        }
    };

    let ident = &input.ident;
    let mut generics = input.generics.clone();
    for param in generics.type_params_mut() {
        param.bounds.push(parse_quote!(::assistant::schema::Describe));
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::assistant::schema::Describe for #ident #ty_generics #where_clause {
            fn describe() -> ::assistant::schema::TypeDescriptor {
                #body
            }
        }
    })
}

fn unsupported(kind: &str) -> TokenStream {
    quote! { ::assistant::schema::TypeDescriptor::Unsupported(#kind) }
}

fn transparent(field: &Field) -> TokenStream {
    let ty = &field.ty;
    quote! {
        ::assistant::schema::TypeDescriptor::Indirect(
            <#ty as ::assistant::schema::Describe>::describe
        )
    }
}

fn record<'a>(
    input: &DeriveInput,
    container: &ContainerAttrs,
    fields: impl Iterator<Item = &'a Field>,
) -> syn::Result<TokenStream> {
    let name = container
        .rename
        .clone()
        .unwrap_or_else(|| input.ident.unraw().to_string());

    let additional = container
        .additional_properties
        .as_ref()
        .map(|raw| quote! { .additional_properties(#raw) });

    let fields = fields
        .map(|field| describe_field(field, container))
        .collect::<syn::Result<Vec<_>>>()?;

    Ok(quote! {
        ::assistant::schema::TypeDescriptor::Record(
            ::assistant::schema::RecordDescriptor::new::<Self>(#name)
                #additional
                #(.field(#fields))*
        )
    })
}

fn describe_field(field: &Field, container: &ContainerAttrs) -> syn::Result<TokenStream> {
    let Some(ident) = &field.ident else {
        return Err(syn::Error::new_spanned(field, "expected a named field"));
    };
    let ident = ident.unraw().to_string();
    let ty = &field.ty;
    let attrs = FieldAttrs::parse(&field.attrs)?;

    let rename = if attrs.skip {
        Some(quote! { .rename(::assistant::schema::OMIT) })
    } else {
        attrs
            .rename
            .or_else(|| container.rename_all.map(|rule| rule.apply(&ident)))
            .map(|name| quote! { .rename(#name) })
    };
    let omit_empty = (attrs.omit_empty || container.default).then(|| quote! { .omit_empty() });
    let flatten = attrs.flatten.then(|| quote! { .flatten() });

    let mut tags = attrs.tags;
    if let Some(doc) = attrs.doc {
        if !tags.iter().any(|(key, _)| key == "description") {
            tags.insert(0, ("description".to_string(), doc));
        }
    }
    let tags = tags.iter().map(|(key, value)| quote! { .tag(#key, #value) });

    Ok(quote! {
        ::assistant::schema::FieldDescriptor::new(
            #ident,
            <#ty as ::assistant::schema::Describe>::describe,
        )
        #rename
        #omit_empty
        #flatten
        #(#tags)*
    })
}

#[derive(Default)]
struct ContainerAttrs {
    rename: Option<String>,
    rename_all: Option<RenameRule>,
    default: bool,
    transparent: bool,
    additional_properties: Option<String>,
}

impl ContainerAttrs {
    fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut parsed = Self::default();

        for attr in attrs {
            if attr.path().is_ident("serde") {
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("rename") {
                        if let Some(name) = deserialize_name(&meta)? {
                            parsed.rename = Some(name);
                        }
                    } else if meta.path.is_ident("rename_all") {
                        if let Some(rule) = deserialize_name(&meta)? {
                            parsed.rename_all = Some(RenameRule::parse(&meta, &rule)?);
                        }
                    } else if meta.path.is_ident("default") {
                        skip_meta(&meta)?;
                        parsed.default = true;
                    } else if meta.path.is_ident("transparent") {
                        parsed.transparent = true;
                    } else {
                        skip_meta(&meta)?;
                    }
                    Ok(())
                })?;
            } else if attr.path().is_ident("schema") {
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("additionalProperties")
                        || meta.path.is_ident("additional_properties")
                    {
                        let value: Expr = meta.value()?.parse()?;
                        parsed.additional_properties = Some(literal_text(&value)?);
                        Ok(())
                    } else {
                        Err(meta.error("only `additionalProperties` is valid on the type"))
                    }
                })?;
            }
        }

        Ok(parsed)
    }
}

#[derive(Default)]
struct FieldAttrs {
    rename: Option<String>,
    skip: bool,
    omit_empty: bool,
    flatten: bool,
    doc: Option<String>,
    tags: Vec<(String, String)>,
}

impl FieldAttrs {
    fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut parsed = Self::default();
        let mut doc = Vec::new();

        for attr in attrs {
            if attr.path().is_ident("doc") {
                if let Meta::NameValue(nv) = &attr.meta {
                    if let Expr::Lit(ExprLit {
                        lit: Lit::Str(line),
                        ..
                    }) = &nv.value
                    {
                        doc.push(line.value().trim().to_string());
                    }
                }
            } else if attr.path().is_ident("serde") {
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("rename") {
                        if let Some(name) = deserialize_name(&meta)? {
                            parsed.rename = Some(name);
                        }
                    } else if meta.path.is_ident("skip") || meta.path.is_ident("skip_deserializing")
                    {
                        parsed.skip = true;
                    } else if meta.path.is_ident("skip_serializing_if")
                        || meta.path.is_ident("default")
                    {
                        skip_meta(&meta)?;
                        parsed.omit_empty = true;
                    } else if meta.path.is_ident("flatten") {
                        parsed.flatten = true;
                    } else {
                        skip_meta(&meta)?;
                    }
                    Ok(())
                })?;
            } else if attr.path().is_ident("schema") {
                attr.parse_nested_meta(|meta| {
                    let key = match meta.path.get_ident() {
                        Some(ident) => ident.unraw().to_string(),
                        None => return Err(meta.error("expected a tag name")),
                    };
                    if key == "additionalProperties" || key == "additional_properties" {
                        return Err(meta.error(
                            "`additionalProperties` belongs on the type, not on a field",
                        ));
                    }
                    let Some((canonical, _)) = FIELD_TAGS
                        .iter()
                        .find(|(camel, snake)| *camel == key || *snake == key)
                    else {
                        return Err(meta.error(format!("unknown schema tag `{key}`")));
                    };
                    let value: Expr = meta.value()?.parse()?;
                    parsed
                        .tags
                        .push((canonical.to_string(), literal_text(&value)?));
                    Ok(())
                })?;
            }
        }

        let doc = doc.join("\n").trim().to_string();
        if !doc.is_empty() {
            parsed.doc = Some(doc);
        }
        Ok(parsed)
    }
}

/// The deserialize-side name of `rename = ".."` or `rename(deserialize = "..")`
fn deserialize_name(meta: &ParseNestedMeta) -> syn::Result<Option<String>> {
    if meta.input.peek(syn::Token![=]) {
        let name: LitStr = meta.value()?.parse()?;
        return Ok(Some(name.value()));
    }

    let mut name = None;
    meta.parse_nested_meta(|inner| {
        if inner.path.is_ident("deserialize") {
            let value: LitStr = inner.value()?.parse()?;
            name = Some(value.value());
        } else {
            skip_meta(&inner)?;
        }
        Ok(())
    })?;
    Ok(name)
}

/// Consume the value of a serde option this derive does not interpret
fn skip_meta(meta: &ParseNestedMeta) -> syn::Result<()> {
    if meta.input.peek(syn::Token![=]) {
        let _: Expr = meta.value()?.parse()?;
    } else if meta.input.peek(syn::token::Paren) {
        let content;
        syn::parenthesized!(content in meta.input);
        let _: TokenStream = content.parse()?;
    }
    Ok(())
}

/// Tag literals are kept as written; the engine parses them
fn literal_text(expr: &Expr) -> syn::Result<String> {
    match expr {
        Expr::Lit(ExprLit { lit, .. }) => match lit {
            Lit::Str(s) => Ok(s.value()),
            Lit::Int(i) => Ok(i.base10_digits().to_string()),
            Lit::Float(f) => Ok(f.base10_digits().to_string()),
            Lit::Bool(b) => Ok(b.value.to_string()),
            other => Err(syn::Error::new_spanned(
                other,
                "expected a string, number or bool literal",
            )),
        },
        Expr::Unary(ExprUnary {
            op: UnOp::Neg(_),
            expr: inner,
            ..
        }) => match &**inner {
            Expr::Lit(ExprLit {
                lit: Lit::Int(i), ..
            }) => Ok(format!("-{}", i.base10_digits())),
            Expr::Lit(ExprLit {
                lit: Lit::Float(f),
                ..
            }) => Ok(format!("-{}", f.base10_digits())),
            other => Err(syn::Error::new_spanned(other, "expected a number literal")),
        },
        other => Err(syn::Error::new_spanned(
            other,
            "expected a string, number or bool literal",
        )),
    }
}

/// serde's `rename_all` rules, applied to snake_case field names
#[derive(Clone, Copy)]
enum RenameRule {
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
    fn parse(meta: &ParseNestedMeta, rule: &str) -> syn::Result<Self> {
        Ok(match rule {
            "lowercase" => RenameRule::Lower,
            "UPPERCASE" => RenameRule::Upper,
            "PascalCase" => RenameRule::Pascal,
            "camelCase" => RenameRule::Camel,
            "snake_case" => RenameRule::Snake,
            "SCREAMING_SNAKE_CASE" => RenameRule::ScreamingSnake,
            "kebab-case" => RenameRule::Kebab,
            "SCREAMING-KEBAB-CASE" => RenameRule::ScreamingKebab,
            _ => return Err(meta.error(format!("unknown rename rule `{rule}`"))),
        })
    }

    fn apply(self, field: &str) -> String {
        match self {
            RenameRule::Lower | RenameRule::Snake => field.to_string(),
            RenameRule::Upper | RenameRule::ScreamingSnake => field.to_ascii_uppercase(),
            RenameRule::Pascal => pascal_case(field),
            RenameRule::Camel => {
                let pascal = pascal_case(field);
                let mut chars = pascal.chars();
                match chars.next() {
                    Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
                    None => pascal,
                }
            }
            RenameRule::Kebab => field.replace('_', "-"),
            RenameRule::ScreamingKebab => field.to_ascii_uppercase().replace('_', "-"),
        }
    }
}

fn pascal_case(field: &str) -> String {
    let mut pascal = String::new();
    let mut capitalize = true;
    for c in field.chars() {
        if c == '_' {
            capitalize = true;
        } else if capitalize {
            pascal.push(c.to_ascii_uppercase());
            capitalize = false;
        } else {
            pascal.push(c);
        }
    }
    pascal
}
