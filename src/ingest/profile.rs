//! Grammar profile table.
//!
//! Pure data: for each [`Language`], the tree-sitter node kinds that stand for
//! each semantic category. The structural walker never branches on a
//! language; it only consults the profile selected at parse start. Adding a
//! language means adding a row here (and, optionally, linking its grammar in
//! the parser registry).

use super::detect::Language;

/// Heuristic extractor family used when no grammar is usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackFamily {
    /// Blocks delimited by indentation (Python-like)
    Indentation,
    /// Blocks delimited by `{` / `}` (C-family)
    Brace,
    /// No block heuristic; the whole file becomes one module unit
    WholeFile,
}

/// Category → node-kind mapping for one language grammar.
#[derive(Debug)]
pub struct GrammarProfile {
    /// Function-like definitions (also matched for methods inside class bodies
    /// and for the right-hand side of assignment-style definitions)
    pub function_kinds: &'static [&'static str],
    /// Class-like definitions whose body may hold methods
    pub class_kinds: &'static [&'static str],
    /// Import statements; recorded verbatim
    pub import_kinds: &'static [&'static str],
    /// Export wrappers around a declaration
    pub export_kinds: &'static [&'static str],
    /// Interface / trait / protocol definitions
    pub interface_kinds: &'static [&'static str],
    /// Type alias definitions
    pub type_alias_kinds: &'static [&'static str],
    /// Wrappers that carry decorators or templates around a definition
    pub decorator_kinds: &'static [&'static str],
    /// Declarations that may bind a function value (`const f = () => {}`)
    pub declaration_kinds: &'static [&'static str],
    /// Declarator nodes inside `declaration_kinds`
    pub declarator_kinds: &'static [&'static str],
    /// Candidate class body kinds, tried in order
    pub body_kinds: &'static [&'static str],
    /// Comment node kinds
    pub comment_kinds: &'static [&'static str],
    /// Sibling nodes skipped when looking for a preceding doc comment
    pub attribute_kinds: &'static [&'static str],
    /// First statement string literal is the docstring
    pub docstring_first_statement: bool,
    /// Fallback family
    pub fallback: FallbackFamily,
    /// `'...'` is a string (true) or a char literal (false) when counting braces
    pub single_quote_strings: bool,
}

/// Node kinds accepted by the "first identifier-like child" naming rule.
pub const IDENTIFIER_KINDS: &[&str] = &[
    "identifier",
    "type_identifier",
    "property_identifier",
    "field_identifier",
    "simple_identifier",
    "constant",
    "name",
];

impl GrammarProfile {
    pub fn is_function(&self, kind: &str) -> bool {
        self.function_kinds.contains(&kind)
    }

    pub fn is_class(&self, kind: &str) -> bool {
        self.class_kinds.contains(&kind)
    }

    pub fn is_import(&self, kind: &str) -> bool {
        self.import_kinds.contains(&kind)
    }

    pub fn is_export(&self, kind: &str) -> bool {
        self.export_kinds.contains(&kind)
    }

    pub fn is_interface(&self, kind: &str) -> bool {
        self.interface_kinds.contains(&kind)
    }

    pub fn is_type_alias(&self, kind: &str) -> bool {
        self.type_alias_kinds.contains(&kind)
    }

    pub fn is_decorator(&self, kind: &str) -> bool {
        self.decorator_kinds.contains(&kind)
    }

    pub fn is_declaration(&self, kind: &str) -> bool {
        self.declaration_kinds.contains(&kind)
    }

    pub fn is_declarator(&self, kind: &str) -> bool {
        self.declarator_kinds.contains(&kind)
    }

    pub fn is_comment(&self, kind: &str) -> bool {
        self.comment_kinds.contains(&kind)
    }

    pub fn is_attribute(&self, kind: &str) -> bool {
        self.attribute_kinds.contains(&kind)
    }
}

const NONE: &[&str] = &[];

static PYTHON: GrammarProfile = GrammarProfile {
    function_kinds: &["function_definition"],
    class_kinds: &["class_definition"],
    import_kinds: &["import_statement", "import_from_statement", "future_import_statement"],
    export_kinds: NONE,
    interface_kinds: NONE,
    type_alias_kinds: &["type_alias_statement"],
    decorator_kinds: &["decorated_definition"],
    declaration_kinds: NONE,
    declarator_kinds: NONE,
    body_kinds: &["block"],
    comment_kinds: &["comment"],
    attribute_kinds: NONE,
    docstring_first_statement: true,
    fallback: FallbackFamily::Indentation,
    single_quote_strings: true,
};

static JAVASCRIPT: GrammarProfile = GrammarProfile {
    function_kinds: &[
        "function_declaration",
        "generator_function_declaration",
        "method_definition",
        "function_expression",
        "function",
        "arrow_function",
        "generator_function",
    ],
    class_kinds: &["class_declaration", "class"],
    import_kinds: &["import_statement"],
    export_kinds: &["export_statement"],
    interface_kinds: NONE,
    type_alias_kinds: NONE,
    decorator_kinds: NONE,
    declaration_kinds: &["lexical_declaration", "variable_declaration"],
    declarator_kinds: &["variable_declarator"],
    body_kinds: &["class_body"],
    comment_kinds: &["comment"],
    attribute_kinds: NONE,
    docstring_first_statement: false,
    fallback: FallbackFamily::Brace,
    single_quote_strings: true,
};

static TYPESCRIPT: GrammarProfile = GrammarProfile {
    function_kinds: &[
        "function_declaration",
        "generator_function_declaration",
        "function_signature",
        "method_definition",
        "method_signature",
        "abstract_method_signature",
        "function_expression",
        "function",
        "arrow_function",
        "generator_function",
    ],
    class_kinds: &["class_declaration", "abstract_class_declaration", "class"],
    import_kinds: &["import_statement"],
    export_kinds: &["export_statement"],
    interface_kinds: &["interface_declaration"],
    type_alias_kinds: &["type_alias_declaration"],
    decorator_kinds: NONE,
    declaration_kinds: &["lexical_declaration", "variable_declaration"],
    declarator_kinds: &["variable_declarator"],
    body_kinds: &["class_body"],
    comment_kinds: &["comment"],
    attribute_kinds: NONE,
    docstring_first_statement: false,
    fallback: FallbackFamily::Brace,
    single_quote_strings: true,
};

static JAVA: GrammarProfile = GrammarProfile {
    function_kinds: &["method_declaration", "constructor_declaration"],
    class_kinds: &["class_declaration", "enum_declaration", "record_declaration"],
    import_kinds: &["import_declaration"],
    export_kinds: NONE,
    interface_kinds: &["interface_declaration", "annotation_type_declaration"],
    type_alias_kinds: NONE,
    decorator_kinds: NONE,
    declaration_kinds: NONE,
    declarator_kinds: NONE,
    body_kinds: &["class_body", "enum_body"],
    comment_kinds: &["line_comment", "block_comment", "comment"],
    attribute_kinds: NONE,
    docstring_first_statement: false,
    fallback: FallbackFamily::Brace,
    single_quote_strings: false,
};

static C: GrammarProfile = GrammarProfile {
    function_kinds: &["function_definition"],
    class_kinds: &["struct_specifier"],
    import_kinds: &["preproc_include"],
    export_kinds: NONE,
    interface_kinds: NONE,
    type_alias_kinds: &["type_definition"],
    decorator_kinds: NONE,
    declaration_kinds: NONE,
    declarator_kinds: NONE,
    body_kinds: &["field_declaration_list"],
    comment_kinds: &["comment"],
    attribute_kinds: NONE,
    docstring_first_statement: false,
    fallback: FallbackFamily::Brace,
    single_quote_strings: false,
};

static CPP: GrammarProfile = GrammarProfile {
    function_kinds: &["function_definition"],
    class_kinds: &["class_specifier", "struct_specifier"],
    import_kinds: &["preproc_include", "using_declaration"],
    export_kinds: NONE,
    interface_kinds: NONE,
    type_alias_kinds: &["type_definition", "alias_declaration"],
    decorator_kinds: &["template_declaration"],
    declaration_kinds: NONE,
    declarator_kinds: NONE,
    body_kinds: &["field_declaration_list"],
    comment_kinds: &["comment"],
    attribute_kinds: NONE,
    docstring_first_statement: false,
    fallback: FallbackFamily::Brace,
    single_quote_strings: false,
};

static RUST: GrammarProfile = GrammarProfile {
    function_kinds: &["function_item", "function_signature_item"],
    class_kinds: &["struct_item", "enum_item", "union_item", "impl_item"],
    import_kinds: &["use_declaration", "extern_crate_declaration"],
    export_kinds: NONE,
    interface_kinds: &["trait_item"],
    type_alias_kinds: &["type_item"],
    decorator_kinds: NONE,
    declaration_kinds: NONE,
    declarator_kinds: NONE,
    body_kinds: &["declaration_list", "field_declaration_list", "enum_variant_list"],
    comment_kinds: &["line_comment", "block_comment"],
    attribute_kinds: &["attribute_item"],
    docstring_first_statement: false,
    fallback: FallbackFamily::Brace,
    single_quote_strings: false,
};

static GO: GrammarProfile = GrammarProfile {
    function_kinds: &["function_declaration", "method_declaration"],
    class_kinds: &["type_declaration"],
    import_kinds: &["import_declaration"],
    export_kinds: NONE,
    interface_kinds: NONE,
    type_alias_kinds: NONE,
    decorator_kinds: NONE,
    declaration_kinds: NONE,
    declarator_kinds: NONE,
    body_kinds: &["field_declaration_list"],
    comment_kinds: &["comment"],
    attribute_kinds: NONE,
    docstring_first_statement: false,
    fallback: FallbackFamily::Brace,
    single_quote_strings: false,
};

static RUBY: GrammarProfile = GrammarProfile {
    function_kinds: &["method", "singleton_method"],
    class_kinds: &["class", "module"],
    import_kinds: NONE,
    export_kinds: NONE,
    interface_kinds: NONE,
    type_alias_kinds: NONE,
    decorator_kinds: NONE,
    declaration_kinds: NONE,
    declarator_kinds: NONE,
    body_kinds: &["body_statement"],
    comment_kinds: &["comment"],
    attribute_kinds: NONE,
    docstring_first_statement: false,
    fallback: FallbackFamily::WholeFile,
    single_quote_strings: true,
};

static PHP: GrammarProfile = GrammarProfile {
    function_kinds: &["function_definition", "method_declaration"],
    class_kinds: &["class_declaration", "trait_declaration", "enum_declaration"],
    import_kinds: &["namespace_use_declaration"],
    export_kinds: NONE,
    interface_kinds: &["interface_declaration"],
    type_alias_kinds: NONE,
    decorator_kinds: NONE,
    declaration_kinds: NONE,
    declarator_kinds: NONE,
    body_kinds: &["declaration_list"],
    comment_kinds: &["comment"],
    attribute_kinds: &["attribute_list"],
    docstring_first_statement: false,
    fallback: FallbackFamily::Brace,
    single_quote_strings: true,
};

static CSHARP: GrammarProfile = GrammarProfile {
    function_kinds: &["method_declaration", "constructor_declaration", "local_function_statement"],
    class_kinds: &["class_declaration", "struct_declaration", "record_declaration"],
    import_kinds: &["using_directive"],
    export_kinds: NONE,
    interface_kinds: &["interface_declaration"],
    type_alias_kinds: NONE,
    decorator_kinds: NONE,
    declaration_kinds: NONE,
    declarator_kinds: NONE,
    body_kinds: &["declaration_list"],
    comment_kinds: &["comment"],
    attribute_kinds: &["attribute_list"],
    docstring_first_statement: false,
    fallback: FallbackFamily::Brace,
    single_quote_strings: false,
};

static KOTLIN: GrammarProfile = GrammarProfile {
    function_kinds: &["function_declaration"],
    class_kinds: &["class_declaration", "object_declaration"],
    import_kinds: &["import_header"],
    export_kinds: NONE,
    interface_kinds: NONE,
    type_alias_kinds: &["type_alias"],
    decorator_kinds: NONE,
    declaration_kinds: NONE,
    declarator_kinds: NONE,
    body_kinds: &["class_body"],
    comment_kinds: &["comment", "line_comment", "multiline_comment"],
    attribute_kinds: NONE,
    docstring_first_statement: false,
    fallback: FallbackFamily::Brace,
    single_quote_strings: false,
};

static SWIFT: GrammarProfile = GrammarProfile {
    function_kinds: &["function_declaration"],
    class_kinds: &["class_declaration"],
    import_kinds: &["import_declaration"],
    export_kinds: NONE,
    interface_kinds: &["protocol_declaration"],
    type_alias_kinds: &["typealias_declaration"],
    decorator_kinds: NONE,
    declaration_kinds: NONE,
    declarator_kinds: NONE,
    body_kinds: &["class_body"],
    comment_kinds: &["comment", "multiline_comment"],
    attribute_kinds: NONE,
    docstring_first_statement: false,
    fallback: FallbackFamily::Brace,
    single_quote_strings: false,
};

static SCALA: GrammarProfile = GrammarProfile {
    function_kinds: &["function_definition"],
    class_kinds: &["class_definition", "object_definition"],
    import_kinds: &["import_declaration"],
    export_kinds: NONE,
    interface_kinds: &["trait_definition"],
    type_alias_kinds: &["type_definition"],
    decorator_kinds: NONE,
    declaration_kinds: NONE,
    declarator_kinds: NONE,
    body_kinds: &["template_body"],
    comment_kinds: &["comment", "block_comment"],
    attribute_kinds: NONE,
    docstring_first_statement: false,
    fallback: FallbackFamily::Brace,
    single_quote_strings: false,
};

/// Look up the profile row for a language.
pub fn profile_for(language: Language) -> &'static GrammarProfile {
    match language {
        Language::Python => &PYTHON,
        Language::JavaScript => &JAVASCRIPT,
        Language::TypeScript | Language::Tsx => &TYPESCRIPT,
        Language::Java => &JAVA,
        Language::C => &C,
        Language::Cpp => &CPP,
        Language::Rust => &RUST,
        Language::Go => &GO,
        Language::Ruby => &RUBY,
        Language::Php => &PHP,
        Language::CSharp => &CSHARP,
        Language::Kotlin => &KOTLIN,
        Language::Swift => &SWIFT,
        Language::Scala => &SCALA,
    }
}
