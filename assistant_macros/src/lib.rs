//! Procedural macros for schema derivation and tool declaration

mod describe;

use proc_macro::TokenStream;
use quote::quote;
use syn::{
    parse_macro_input, punctuated::Punctuated, token::Comma, DeriveInput, Expr, ExprLit, FnArg,
    ItemFn, Lit, Meta, Type,
};

/// Derive `assistant::schema::Describe` for a struct
///
/// Named structs become records. Newtypes and `#[serde(transparent)]`
/// structs describe as their single field. Enums, tuple structs and unit
/// structs describe as unsupported and fail at schema derivation time.
///
/// The serde attributes that change the wire shape are honored:
/// `rename`, `rename_all`, `skip`, `skip_deserializing`,
/// `skip_serializing_if`, `default` and `flatten`.
///
/// Constraints go in `#[schema(...)]`, for example
/// `#[schema(minimum = 1, enum = "a,b")]`. A field's doc comment is its
/// description unless a `description` tag is given. On the type,
/// `#[schema(additionalProperties = true)]` opens the object.
#[proc_macro_derive(Describe, attributes(schema))]
pub fn derive_describe(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match describe::expand(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// Attribute macro to automatically generate tool declarations from functions
///
/// # Example
///
/// ```ignore
/// #[tool(description = "Perform basic arithmetic operations")]
/// async fn calculator(args: CalculatorArgs) -> Result<CalculatorResult, String> {
///     // Implementation
/// }
/// ```
///
/// This will generate a module `calculator_tool` containing:
/// - `NAME` and `DESCRIPTION` constants
/// - `declaration()`: the ToolDeclaration derived from the argument type
/// - `execute`: Re-export of the annotated function
/// - `registration()`: a complete ToolRegistration for one-step registration
///
/// # Usage
///
/// ```ignore
/// registry.register(calculator_tool::registration()?)?;
/// ```
///
/// # Attributes
///
/// - `description`: What the tool does. Defaults to the function's doc comment
/// - `name`: (optional) Override the tool name (defaults to function name)
#[proc_macro_attribute]
pub fn tool(attr: TokenStream, item: TokenStream) -> TokenStream {
    let attr_args = parse_macro_input!(attr with Punctuated::<Meta, Comma>::parse_terminated);
    let input_fn = parse_macro_input!(item as ItemFn);

    let mut description = None;
    let mut tool_name = None;

    for arg in attr_args {
        let Meta::NameValue(nv) = &arg else {
            return syn::Error::new_spanned(&arg, "expected `key = \"value\"`")
                .to_compile_error()
                .into();
        };
        let Expr::Lit(ExprLit {
            lit: Lit::Str(lit), ..
        }) = &nv.value
        else {
            return syn::Error::new_spanned(&nv.value, "expected a string literal")
                .to_compile_error()
                .into();
        };

        if nv.path.is_ident("description") {
            description = Some(lit.value());
        } else if nv.path.is_ident("name") {
            tool_name = Some(lit.value());
        } else {
            return syn::Error::new_spanned(&nv.path, "unknown tool attribute")
                .to_compile_error()
                .into();
        }
    }

    let description = match description.or_else(|| doc_comment(&input_fn)) {
        Some(d) => d,
        None => {
            return syn::Error::new_spanned(
                &input_fn.sig,
                "tool requires a 'description' parameter or a doc comment",
            )
            .to_compile_error()
            .into();
        }
    };

    let fn_name = &input_fn.sig.ident;
    let tool_name = tool_name.unwrap_or_else(|| fn_name.to_string());

    let arg_type = match single_argument(&input_fn) {
        Ok(ty) => ty,
        Err(err) => return err.to_compile_error().into(),
    };

    // calculator -> calculator_tool
    let module_name = syn::Ident::new(&format!("{}_tool", fn_name), fn_name.span());

    // Made public so the generated module can re-export it
    let mut pub_input_fn = input_fn.clone();
    pub_input_fn.vis = syn::parse_quote!(pub);

    let constructor = if input_fn.sig.asyncness.is_some() {
        quote! { from_async }
    } else {
        quote! { from_sync }
    };

    let output = quote! {
        #pub_input_fn

        #[allow(dead_code)]
        pub mod #module_name {
            use super::*;

            /// The name of this tool (use when registering)
            pub const NAME: &str = #tool_name;

            /// What this tool does, as told to the model
            pub const DESCRIPTION: &str = #description;

            /// Get the ToolDeclaration for this tool
            pub fn declaration() -> ::std::result::Result<
                ::assistant::tools::ToolDeclaration,
                ::assistant::schema::SchemaError,
            > {
                ::assistant::tools::create_tool_declaration::<#arg_type>(NAME, DESCRIPTION)
            }

            /// The executable function for this tool (re-exported from parent)
            pub use super::#fn_name as execute;

            /// Get a complete ToolRegistration for one-step registration
            pub fn registration() -> ::std::result::Result<
                ::assistant::tools::ToolRegistration,
                ::assistant::schema::SchemaError,
            > {
                ::assistant::tools::ToolRegistration::#constructor(NAME, DESCRIPTION, execute)
            }
        }
    };

    TokenStream::from(output)
}

fn doc_comment(input_fn: &ItemFn) -> Option<String> {
    let lines: Vec<String> = input_fn
        .attrs
        .iter()
        .filter(|attr| attr.path().is_ident("doc"))
        .filter_map(|attr| match &attr.meta {
            Meta::NameValue(nv) => match &nv.value {
                Expr::Lit(ExprLit {
                    lit: Lit::Str(line),
                    ..
                }) => Some(line.value().trim().to_string()),
                _ => None,
            },
            _ => None,
        })
        .collect();

    let doc = lines.join("\n").trim().to_string();
    (!doc.is_empty()).then_some(doc)
}

/// The type of the single by-value argument of a tool function
fn single_argument(input_fn: &ItemFn) -> syn::Result<&Type> {
    let mut inputs = input_fn.sig.inputs.iter();
    match (inputs.next(), inputs.next()) {
        (Some(FnArg::Typed(pat_type)), None) => match &*pat_type.ty {
            Type::Reference(_) => Err(syn::Error::new_spanned(
                &pat_type.ty,
                "tool arguments must be taken by value",
            )),
            ty => Ok(ty),
        },
        _ => Err(syn::Error::new_spanned(
            &input_fn.sig,
            "tool function must take exactly one argument",
        )),
    }
}
