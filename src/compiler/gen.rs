//! The code generator.
//!
//! Lowers an annotated (and normally unrolled and substituted) tree
//! to a C program with OpenMP pragmas. Two streams come out: the
//! declarations of the per-collection value tables, and the program
//! text; [`CProgram::source`] splices them back together into one
//! compilable unit, with every table on the stack of `main`.
//!
//! Emission is syntax-directed and handles all seven collection
//! shapes, so a tree that still carries repetitions lowers to
//! counted loops rather than relying on the unroll pass having run.

use wave_common::operator::Operator;

use crate::compiler::follow::{follow, Count};
use crate::compiler::syntax::{Note, Syntax};
use crate::construct::atom::Atom;
use crate::construct::collection::{Collection, NodeId, Repetition, Tree};
use crate::construct::coordinate::Coordinate;
use crate::construct::path::Path;
use crate::construct::phrase::Program;

const PROLOGUE: &str = "#include \"wave_runtime.h\"\n\nint main (void)\n{\n";
const EPILOGUE: &str = "wave_garbage_destroy ();\nreturn 0;\n}\n";

/// The loop variable of repetition loops.
const ITERATOR: &str = "__wave__parallel__iterator__";

/// The generated program, as its two structural streams.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CProgram {
    /// Table declarations only.
    pub declarations: String,
    /// The phrase blocks.
    pub body: String,
}

impl CProgram {
    /// The program stream alone, without the table declarations.
    pub fn code(&self) -> String {
        format!("{}{}{}", PROLOGUE, self.body, EPILOGUE)
    }

    /// The complete compilable source: declarations first, then the
    /// phrase blocks, all on the stack of `main`.
    pub fn source(&self) -> String {
        format!("{}{}{}{}", PROLOGUE, self.declarations, self.body, EPILOGUE)
    }
}

/// A counter of pending closing braces, so a subtree can open
/// control blocks freely and flush them when it ends. `backup` and
/// `restore` bracket regions that must come out balanced.
#[derive(Debug, Default)]
pub struct CurlyStack {
    pending: usize,
}

impl CurlyStack {
    pub fn new() -> CurlyStack {
        CurlyStack::default()
    }

    /// One more brace to close later.
    pub fn stack(&mut self) {
        self.pending += 1;
    }

    pub fn backup(&self) -> usize {
        self.pending
    }

    pub fn restore(&mut self, saved: usize) {
        self.pending = saved;
    }

    /// Emits closing braces down to a backup point.
    pub fn flush_to(&mut self, saved: usize, out: &mut String) {
        while self.pending > saved {
            out.push_str("}\n");
            self.pending -= 1;
        }
    }

    /// Emits every pending closing brace.
    pub fn flush(&mut self, out: &mut String) {
        self.flush_to(0, out);
    }
}

/// Generates C for a fully annotated program.
pub fn generate(program: &Program) -> Result<CProgram, Syntax> {
    let mut generator = Generator {
        tree: &program.tree,
        declarations: String::new(),
        body: String::new(),
        curly: CurlyStack::new(),
        bare_table_declared: false,
    };

    for phrase in &program.phrases {
        generator.phrase(phrase.root)?;
    }

    Ok(CProgram {
        declarations: generator.declarations,
        body: generator.body,
    })
}

/// The base type of a literal slot, as the emitted program sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Base {
    Int,
    Float,
    Bool,
    Char,
    String,
}

impl Base {
    /// The `_content` field and function-name infix.
    fn name(self) -> &'static str {
        match self {
            Base::Int => "int",
            Base::Float => "float",
            Base::Bool => "bool",
            Base::Char => "char",
            Base::String => "string",
        }
    }

    /// The `_type` tag constant.
    fn tag(self) -> &'static str {
        match self {
            Base::Int => "WAVE_DATA_INT",
            Base::Float => "WAVE_DATA_FLOAT",
            Base::Bool => "WAVE_DATA_BOOL",
            Base::Char => "WAVE_DATA_CHAR",
            Base::String => "WAVE_DATA_STRING",
        }
    }
}

fn base_of(atom: &Atom) -> Option<Base> {
    match atom {
        Atom::Int(_) => Some(Base::Int),
        Atom::Float(_) => Some(Base::Float),
        Atom::Bool(_) => Some(Base::Bool),
        Atom::Char(_) => Some(Base::Char),
        Atom::String(_) => Some(Base::String),
        _ => None,
    }
}

/// The result type of an admissible `(base, unary op)` pair, `None`
/// when the pair must go through the runtime dispatcher.
fn unary_result(base: Base, op: Operator) -> Option<Base> {
    use Operator::*;
    Some(match (base, op) {
        (Base::Int, UnaryPlus | UnaryMinus | Increment | Decrement) => Base::Int,
        (Base::Int, Sqrt | Sin | Cos | Log | Exp | Ceil | Floor) => Base::Float,
        (Base::Int, Chr) => Base::Char,
        (
            Base::Float,
            UnaryPlus | UnaryMinus | Increment | Decrement | Sqrt | Sin | Cos | Log | Exp
            | Ceil | Floor,
        ) => Base::Float,
        (Base::Bool, Not) => Base::Bool,
        (Base::Char, Code) => Base::Int,
        _ => return None,
    })
}

/// The result type of an admissible same-base binary pair, `None`
/// when the pair must go through the runtime dispatcher.
fn binary_result(base: Base, op: Operator) -> Option<Base> {
    use Operator::*;
    if op.is_test() {
        return Some(Base::Bool);
    }
    Some(match (base, op) {
        (Base::Int, Plus | Minus | Min | Max | Times | Divide | Mod) => Base::Int,
        (Base::Float, Plus | Minus | Min | Max | Times | Divide | Mod) => Base::Float,
        (Base::Bool, And | Or) => Base::Bool,
        (Base::Char, Plus) => Base::String,
        (Base::Char, Min | Max) => Base::Char,
        (Base::String, Plus | Min | Max) => Base::String,
        _ => return None,
    })
}

struct Generator<'a> {
    tree: &'a Tree,
    declarations: String,
    body: String,
    curly: CurlyStack,
    bare_table_declared: bool,
}

impl<'a> Generator<'a> {
    ////////////////////////////////////////////////////////////////////////
    // Plumbing.
    ////////////////////////////////////////////////////////////////////////

    fn line(&mut self, text: &str) {
        self.body.push_str(text);
        self.body.push('\n');
    }

    fn open(&mut self) {
        self.body.push_str("{\n");
        self.curly.stack();
    }

    fn flush_to(&mut self, saved: usize) {
        self.curly.flush_to(saved, &mut self.body);
    }

    /// The table a node's slot lives in: named after the enclosing
    /// collection's full indexes.
    fn table_of(&self, id: NodeId) -> String {
        match self.tree.parent(id) {
            Some(parent) => format!("wave_tab{}", self.tree.full_indexes(parent)),
            None => "wave_tab".to_string(),
        }
    }

    fn slot(&self, id: NodeId) -> String {
        format!("{}[{}]", self.table_of(id), self.tree[id].info.coordinate)
    }

    /// The slot `delta` places before `id` in the same table.
    fn shifted(&self, id: NodeId, delta: i64) -> String {
        let coordinate = Coordinate::plus(
            Coordinate::Constant(delta),
            self.tree[id].info.coordinate.clone(),
        );
        format!("{}[{}]", self.table_of(id), coordinate)
    }

    /// Declares the value table of a collection with children.
    fn declare_table(&mut self, id: NodeId) {
        if let Some(size) = self.tree.table_size(id) {
            let declaration = format!(
                "wave_data wave_tab{}[{}];\n",
                self.tree.full_indexes(id),
                size,
            );
            self.declarations.push_str(&declaration);
        }
    }

    /// Declares the one-slot table backing atoms that sit directly at
    /// the top of a phrase.
    fn declare_bare_table(&mut self) {
        if !self.bare_table_declared {
            self.declarations.push_str("wave_data wave_tab[1];\n");
            self.bare_table_declared = true;
        }
    }

    /// Whether the node runs under a parallel construct.
    fn inside_parallel(&self, id: NodeId) -> bool {
        let mut current = self.tree.parent(id);
        while let Some(ancestor) = current {
            if self.tree.kind(ancestor).is_parallel() {
                return true;
            }
            current = self.tree.parent(ancestor);
        }
        false
    }

    ////////////////////////////////////////////////////////////////////////
    // Collections.
    ////////////////////////////////////////////////////////////////////////

    fn phrase(&mut self, root: NodeId) -> Result<(), Syntax> {
        if self.tree.kind(root).is_atom() {
            self.declare_bare_table();
        }

        let saved = self.curly.backup();
        self.open();
        self.collection(root)?;
        self.line("wave_garbage_clean ();");
        self.flush_to(saved);
        Ok(())
    }

    fn chain(&mut self, head: NodeId) -> Result<(), Syntax> {
        for id in self.tree.chain(head) {
            self.collection(id)?;
        }
        Ok(())
    }

    fn collection(&mut self, id: NodeId) -> Result<(), Syntax> {
        let tree = self.tree;
        match tree.kind(id) {
            Collection::Atom(atom) => self.atom(id, &atom.clone()),

            Collection::Seq(list) => {
                self.declare_table(id);
                match list {
                    Some(head) => self.chain(*head),
                    None => Ok(()),
                }
            },

            Collection::Par(list) => {
                self.declare_table(id);
                self.par_region(*list)
            },

            Collection::CyclicSeq(list) => {
                self.declare_table(id);
                let saved = self.curly.backup();
                self.line("for (;;)");
                self.open();
                if let Some(head) = *list {
                    self.chain(head)?;
                }
                self.flush_to(saved);
                Ok(())
            },

            Collection::CyclicPar(list) => {
                self.declare_table(id);
                let saved = self.curly.backup();
                self.line("for (;;)");
                self.open();
                self.par_region(*list)?;
                self.flush_to(saved);
                Ok(())
            },

            Collection::RepSeq(repetition, list) => {
                self.declare_table(id);
                let count = self.repetition_count(id, &repetition.clone())?;
                let saved = self.curly.backup();
                self.for_header(&count);
                self.open();
                if let Some(head) = *list {
                    self.chain(head)?;
                }
                self.flush_to(saved);
                Ok(())
            },

            Collection::RepPar(repetition, list) => {
                self.declare_table(id);
                let count = self.repetition_count(id, &repetition.clone())?;
                let list = *list;
                let saved = self.curly.backup();
                self.line("#pragma omp parallel");
                self.open();
                self.line("#pragma omp for");
                self.for_header(&count);
                self.open();
                self.line("#pragma omp sections");
                self.open();
                self.sections(list)?;
                self.flush_to(saved);
                Ok(())
            },
        }
    }

    /// `parallel` / `sections` around one section per child.
    fn par_region(&mut self, list: Option<NodeId>) -> Result<(), Syntax> {
        let saved = self.curly.backup();
        self.line("#pragma omp parallel");
        self.open();
        self.line("#pragma omp sections");
        self.open();
        self.sections(list)?;
        self.flush_to(saved);
        Ok(())
    }

    fn sections(&mut self, list: Option<NodeId>) -> Result<(), Syntax> {
        if let Some(head) = list {
            for child in self.tree.chain(head) {
                let saved = self.curly.backup();
                self.line("#pragma omp section");
                self.open();
                self.collection(child)?;
                self.flush_to(saved);
            }
        }
        Ok(())
    }

    fn for_header(&mut self, count: &str) {
        self.line(&format!(
            "for (int {it} = 0; {it} < {count}; ++{it})",
            it = ITERATOR,
            count = count,
        ));
    }

    /// The loop count of a repetition that survived to generation:
    /// the constant, or the record length of the path measured here.
    fn repetition_count(&self, id: NodeId, repetition: &Repetition) -> Result<String, Syntax> {
        match repetition {
            Repetition::Times(times) => Ok(times.to_string()),
            Repetition::Path(path) => {
                match follow(self.tree, id, path, Count::LastRecord, None) {
                    Some(journey) => Ok(journey.length.to_string()),
                    None => Err(Syntax::error(
                        "The path of this repetition is not valid here",
                        &self.tree[id].span,
                    )),
                }
            },
        }
    }

    ////////////////////////////////////////////////////////////////////////
    // Atoms.
    ////////////////////////////////////////////////////////////////////////

    fn atom(&mut self, id: NodeId, atom: &Atom) -> Result<(), Syntax> {
        match atom {
            Atom::Operator(op) => self.operator(id, *op),
            Atom::Path(path) => {
                self.path_atom(id, path);
                Ok(())
            },
            Atom::Unknown => Ok(()),
            literal => {
                // base_of covers every literal variant.
                if let Some(base) = base_of(literal) {
                    let slot = self.slot(id);
                    self.line(&format!(
                        "{}._content._{} = {};",
                        slot,
                        base.name(),
                        literal,
                    ));
                    self.line(&format!("{}._type = {};", slot, base.tag()));
                }
                Ok(())
            },
        }
    }

    /// The base type of a sibling's slot when it is statically
    /// known, i.e. when the sibling is a literal atom.
    fn literal_base(&self, id: NodeId) -> Option<Base> {
        match self.tree.kind(id) {
            Collection::Atom(atom) => base_of(atom),
            _ => None,
        }
    }

    fn operator(&mut self, id: NodeId, op: Operator) -> Result<(), Syntax> {
        if op.is_unary() {
            self.unary(id, op)
        } else if op.is_binary() {
            self.binary(id, op)
        } else {
            self.specific(id, op)
        }
    }

    /// A unary operator reads the slot before its own and writes its
    /// own. Known admissible operand types get the typed runtime
    /// call; everything else defers to the dispatcher.
    fn unary(&mut self, id: NodeId, op: Operator) -> Result<(), Syntax> {
        let operand = match self.tree.previous(id) {
            Some(operand) => operand,
            None => {
                return Err(Syntax::error(
                    &format!("The unary operator `{}` has no operand before it", op),
                    &self.tree[id].span,
                ));
            },
        };

        let typed = self
            .literal_base(operand)
            .and_then(|base| unary_result(base, op).map(|result| (base, result)));

        match typed {
            Some((base, result)) => {
                let slot = self.slot(id);
                self.line(&format!("{}._type = {};", slot, result.tag()));
                self.line(&format!(
                    "{}._content._{} = wave_{}_{} ({}._content._{});",
                    slot,
                    result.name(),
                    base.name(),
                    op.runtime_suffix(),
                    self.shifted(id, -1),
                    base.name(),
                ));
            },
            None => {
                self.line(&format!(
                    "wave_data_unary (& {}, & {}, {});",
                    self.shifted(id, -1),
                    self.slot(id),
                    op.runtime_constant(),
                ));
            },
        }
        Ok(())
    }

    /// A binary operator reads the two slots before its own and
    /// writes its own.
    fn binary(&mut self, id: NodeId, op: Operator) -> Result<(), Syntax> {
        let (left, right) = match self
            .tree
            .previous(id)
            .and_then(|right| self.tree.previous(right).map(|left| (left, right)))
        {
            Some(operands) => operands,
            None => {
                return Err(Syntax::error(
                    &format!(
                        "The binary operator `{}` needs two operands before it",
                        op,
                    ),
                    &self.tree[id].span,
                ));
            },
        };

        let typed = match (self.literal_base(left), self.literal_base(right)) {
            (Some(l), Some(r)) if l == r => binary_result(l, op).map(|result| (l, result)),
            _ => None,
        };

        match typed {
            Some((base, result)) => {
                let slot = self.slot(id);
                self.line(&format!("{}._type = {};", slot, result.tag()));
                self.line(&format!(
                    "{}._content._{} = wave_{}_{} ({}._content._{}, {}._content._{});",
                    slot,
                    result.name(),
                    base.name(),
                    op.runtime_suffix(),
                    self.shifted(id, -2),
                    base.name(),
                    self.shifted(id, -1),
                    base.name(),
                ));
                // Fresh text must reach the collector like any other
                // runtime allocation.
                if result == Base::String {
                    self.line(&format!(
                        "wave_garbage_register ({}._content._string);",
                        slot,
                    ));
                }
            },
            None => {
                self.line(&format!(
                    "wave_data_binary (& {}, & {}, & {}, {});",
                    self.shifted(id, -2),
                    self.shifted(id, -1),
                    self.slot(id),
                    op.runtime_constant(),
                ));
            },
        }
        Ok(())
    }

    fn specific(&mut self, id: NodeId, op: Operator) -> Result<(), Syntax> {
        match op {
            Operator::Atom => {
                let slot = self.slot(id);
                match self.tree.previous(id) {
                    Some(_) => {
                        self.line(&format!("{}._type = WAVE_DATA_BOOL;", slot));
                        self.line(&format!(
                            "{}._content._bool = wave_data_is_atom (& {});",
                            slot,
                            self.shifted(id, -1),
                        ));
                        Ok(())
                    },
                    None => Err(Syntax::error(
                        "The `atom` operator has no operand before it",
                        &self.tree[id].span,
                    )),
                }
            },

            Operator::Print => {
                self.ordered_only(id, op)?;
                match self.tree.previous(id) {
                    Some(_) => {
                        self.line(&format!("wave_data_print (& {});", self.shifted(id, -1)));
                        Ok(())
                    },
                    None => Err(Syntax::error(
                        "The `print` operator has no operand before it",
                        &self.tree[id].span,
                    )),
                }
            },

            Operator::Read => {
                self.ordered_only(id, op)?;
                self.line(&format!("wave_data_read (& {});", self.slot(id)));
                Ok(())
            },

            // `?` and `!` steer evaluation; they produce no slot
            // writes.
            _ => Ok(()),
        }
    }

    /// Side-effecting operators have no defined order inside a
    /// parallel region, so they are rejected there.
    fn ordered_only(&self, id: NodeId, op: Operator) -> Result<(), Syntax> {
        if self.inside_parallel(id) {
            return Err(Syntax::error_with_note(
                &format!("`{}` inside a parallel collection has no defined order", op),
                Note::new_with_hint(
                    "move the operator into a sequential collection",
                    &self.tree[id].span,
                ),
            ));
        }
        Ok(())
    }

    /// A path atom resolved here becomes a slot-to-slot copy; one
    /// that does not resolve is deferred to the runtime.
    fn path_atom(&mut self, id: NodeId, path: &Path) {
        match follow(self.tree, id, path, Count::LastRecord, None) {
            Some(journey) => {
                let target = self.slot(journey.destination);
                self.line(&format!("{} = {};", self.slot(id), target));
            },
            None => {
                self.line(&format!(
                    "wave_data_follow_path (& {}, \"{}\");",
                    self.slot(id),
                    path,
                ));
            },
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::common::source::Source;
    use crate::compiler::compile;

    fn emitted(source: &str) -> Result<CProgram, Syntax> {
        compile(Source::source(source))
    }

    #[test]
    fn curly_stack() {
        let mut curly = CurlyStack::new();
        let mut out = String::new();

        let saved = curly.backup();
        curly.stack();
        curly.stack();
        curly.stack();
        let inner = curly.backup();
        assert_eq!(inner, 3);

        curly.flush_to(saved, &mut out);
        assert_eq!(out, "}\n}\n}\n");
        assert_eq!(curly.backup(), 0);

        curly.restore(inner);
        assert_eq!(curly.backup(), 3);
        out.clear();
        curly.flush(&mut out);
        assert_eq!(out, "}\n}\n}\n");
    }

    #[test]
    fn scalar_sum() {
        let program = emitted("(1;2;+).").unwrap();
        assert!(program.declarations.contains("wave_data wave_tab_0[3];"));

        let body = &program.body;
        assert!(body.contains("wave_tab_0[0]._content._int = 1;"));
        assert!(body.contains("wave_tab_0[0]._type = WAVE_DATA_INT;"));
        assert!(body.contains("wave_tab_0[1]._content._int = 2;"));
        assert!(body.contains(
            "wave_tab_0[2]._content._int = \
             wave_int_binary_plus (wave_tab_0[0]._content._int, wave_tab_0[1]._content._int);"
        ));
        assert!(body.contains("wave_tab_0[2]._type = WAVE_DATA_INT;"));
    }

    #[test]
    fn parallel_sections() {
        let program = emitted("(1||2||3).").unwrap();
        let body = &program.body;
        assert!(body.contains("#pragma omp parallel"));
        assert!(body.contains("#pragma omp sections"));
        assert_eq!(body.matches("#pragma omp section\n").count(), 3);
        assert!(body.contains("wave_tab_0[2]._content._int = 3;"));
    }

    #[test]
    fn unrolled_repetition_lays_out_flat() {
        let program = emitted("{;1;2} 3.").unwrap();
        assert!(program.declarations.contains("wave_data wave_tab_0[6];"));
        assert!(program.body.contains("wave_tab_0[5]._content._int = 2;"));
        assert!(!program.body.contains("for (int"));
    }

    #[test]
    fn resolved_path_is_a_slot_copy() {
        // Driving the generator before substitution: a resolvable
        // path atom lowers to a direct slot copy.
        let mut program = crate::compiler::parse(Source::source("(1;@p).")).unwrap();
        crate::compiler::annotate::annotate(&mut program);
        let emitted = generate(&program).unwrap();
        assert!(emitted.body.contains("wave_tab_0[1] = wave_tab_0[0];"));
    }

    #[test]
    fn surviving_repetition_lowers_to_a_loop() {
        // The generator is syntax-directed: a repetition that was
        // not unrolled comes out as a counted loop over a table the
        // size of one round.
        let mut program = crate::compiler::parse(Source::source("{;1;2} 3.")).unwrap();
        crate::compiler::annotate::annotate(&mut program);
        let emitted = generate(&program).unwrap();
        assert!(emitted.body.contains(
            "for (int __wave__parallel__iterator__ = 0; \
             __wave__parallel__iterator__ < 3; ++__wave__parallel__iterator__)"
        ));
        assert!(emitted.declarations.contains("wave_data wave_tab_0[2];"));
    }

    #[test]
    fn unresolved_path_defers_to_runtime() {
        let program = emitted("(1;@ppp).").unwrap();
        assert!(program
            .body
            .contains("wave_data_follow_path (& wave_tab_0[1], \"p p p\");"));
    }

    #[test]
    fn inadmissible_pair_compiles_to_dispatch() {
        // `1 + "a"` is a runtime type error; the compiler still
        // emits the program and lets the dispatcher abort.
        let program = emitted("(1;\"a\";+).").unwrap();
        assert!(program.body.contains(
            "wave_data_binary (& wave_tab_0[0], & wave_tab_0[1], & wave_tab_0[2], \
             WAVE_OP_BINARY_PLUS);"
        ));
    }

    #[test]
    fn unary_changes_the_result_type() {
        let program = emitted("(4;sqrt).").unwrap();
        let body = &program.body;
        assert!(body.contains("wave_tab_0[1]._type = WAVE_DATA_FLOAT;"));
        assert!(body.contains(
            "wave_tab_0[1]._content._float = wave_int_sqrt (wave_tab_0[0]._content._int);"
        ));
    }

    #[test]
    fn string_results_are_registered() {
        let program = emitted("('a';'b';+).").unwrap();
        let body = &program.body;
        assert!(body.contains("wave_tab_0[2]._type = WAVE_DATA_STRING;"));
        assert!(body.contains(
            "wave_tab_0[2]._content._string = \
             wave_char_binary_plus (wave_tab_0[0]._content._char, wave_tab_0[1]._content._char);"
        ));
        assert!(body.contains("wave_garbage_register (wave_tab_0[2]._content._string);"));
    }

    #[test]
    fn comparisons_tag_bool() {
        let program = emitted("(1;2;<).").unwrap();
        let body = &program.body;
        assert!(body.contains("wave_tab_0[2]._type = WAVE_DATA_BOOL;"));
        assert!(body.contains(
            "wave_tab_0[2]._content._bool = \
             wave_int_lesser (wave_tab_0[0]._content._int, wave_tab_0[1]._content._int);"
        ));
    }

    #[test]
    fn print_is_rejected_inside_par() {
        assert!(emitted("((1;print)||2).").is_err());
        assert!(emitted("(1;print).").is_ok());
    }

    #[test]
    fn cyclic_collections_loop_forever() {
        let program = emitted("{;1}.").unwrap();
        assert!(program.body.contains("for (;;)"));
    }

    #[test]
    fn phrase_boundaries_clean_the_registry() {
        let program = emitted("(1;2). (3;4).").unwrap();
        assert_eq!(program.body.matches("wave_garbage_clean ();").count(), 2);
        assert!(program.code().contains("wave_garbage_destroy ();"));
        assert!(program.declarations.contains("wave_data wave_tab_1[2];"));
    }

    #[test]
    fn bare_atom_phrase() {
        let program = emitted("42.").unwrap();
        assert!(program.declarations.contains("wave_data wave_tab[1];"));
        assert!(program.body.contains("wave_tab[0]._content._int = 42;"));
    }

    #[test]
    fn source_is_one_unit() {
        let program = emitted("(1;2;+).").unwrap();
        let source = program.source();
        let declaration = source.find("wave_data wave_tab_0[3];").unwrap();
        let write = source.find("wave_tab_0[0]._content._int = 1;").unwrap();
        assert!(declaration < write);
        assert!(source.starts_with("#include \"wave_runtime.h\""));
        assert!(source.trim_end().ends_with('}'));
    }

    #[test]
    fn braces_balance() {
        for source in [
            "(1;2;+).",
            "(1||2||3).",
            "{;1;2}.",
            "{||1||2}.",
            "((1;2)||(3;4)).",
            "(1;2). (3;4).",
        ] {
            let program = emitted(source).unwrap();
            let text = program.source();
            assert_eq!(
                text.matches('{').count(),
                text.matches('}').count(),
                "unbalanced braces for {}",
                source,
            );
        }
    }
}
