//  Library for the Sono programming language.
// Copyright (C) 2018 to 2019 Charles Johnson
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <http://www.gnu.org/licenses/>.

#[macro_use]
extern crate assert_matches;
#[macro_use]
extern crate proptest;
extern crate sono;
#[macro_use]
extern crate test_sono;

use sono::{Context, Options, SonoError};
use std::{thread, time::Duration};
use test_sono::RESERVED_WORDS;

fn context() -> Context {
    Context::new(Options::default())
}

#[test]
fn arithmetic_follows_precedence() {
    let mut context = context();
    assert_evaluates!(context,
        "2 + 3 * 4" => "14",
        "(2 + 3) * 4" => "20",
        "2 ** 3 ** 2" => "512",
        "7 / 2" => "3.5",
        "10 % 4" => "2",
        "10 - 4 - 3" => "3",
        "num \"2.5\" + 1" => "3.5",
    );
}

#[test]
fn comparisons_and_logic() {
    let mut context = context();
    assert_evaluates!(context,
        "1 < 2 && 2 <= 2" => "true",
        "\"a\" < \"b\"" => "true",
        "1 == \"1\"" => "false",
        "(1, 2) == (1, 2)" => "true",
        "!(3 > 4) || false" => "true",
    );
}

#[test]
fn non_finite_results_are_errors() {
    let mut context = context();
    assert_matches!(context.run("1 / 0"), Err(SonoError::NonFinite { .. }));
    assert_matches!(context.run("sqrt(-1)"), Err(SonoError::NonFinite { .. }));
    assert_evaluates!(context,
        "sqrt(16)" => "4",
        "floor(2.7)" => "2",
        "abs(-3)" => "3",
    );
}

#[test]
fn strings_and_their_methods() {
    let mut context = context();
    assert_evaluates!(context,
        "\"ab\" + \"cd\"" => "abcd",
        "len \"héllo\"" => "5",
        "\"a,b\".split(\",\")" => "[a, b]",
        "(\"x\", 1, true).join(\"-\")" => "x-1-true",
        "\"Sono\".upper()" => "SONO",
        "\"abc\".reverse()" => "cba",
        "\"abc\"[1]" => "b",
    );
}

#[test]
fn vectors_can_be_indexed_and_updated() {
    let mut context = context();
    assert_evaluates!(context,
        "v = (10, 20, 30); v[1]" => "20",
        "v[0] = 5; v" => "[5, 20, 30]",
        "v[2] += 1; v[2]" => "31",
        "len v" => "3",
        "v.contains(20)" => "true",
        "v + (1, 2)" => "[5, 20, 31, 1, 2]",
    );
    assert_matches!(context.run("v[5]"), Err(SonoError::IndexOutOfRange { length: 3, .. }));
}

#[test]
fn dictionaries_hold_keyed_values() {
    let mut context = context();
    assert_evaluates!(context,
        "d = dict(); d[\"a\"] = 1; d[\"b\"] = 2; d" => "{a: 1, b: 2}",
        "d[\"zz\"]" => "",
        "d.has(\"a\")" => "true",
        "d.keys()" => "[a, b]",
        "len d" => "2",
    );
}

#[test]
fn conditionals_choose_a_branch() {
    let mut context = context();
    assert_evaluates!(context,
        "x = 5; x > 3 then \"big\" else \"small\"" => "big",
        "x < 3 then \"big\"" => "",
        "x == 1 then \"one\" else x == 5 then \"five\" else \"many\"" => "five",
    );
    assert_matches!(context.run("1 then 2"), Err(SonoError::TypeMismatch { .. }));
}

#[test]
fn loops_run_until_their_condition_fails() {
    let mut context = context();
    assert_evaluates!(context,
        "total = 0; i in 0 until 5 do { total += i }; total" => "10",
        "n = 0; n < 3 do { n += 1 }; n" => "3",
        "n = 0; true do { n += 1; n == 4 then break }; n" => "4",
        "s = \"\"; c in \"abc\" do { s = c + s }; s" => "cba",
        "0 until 3" => "[0, 1, 2]",
    );
}

#[test]
fn ranges_are_bounded() {
    let mut context = context();
    assert_matches!(
        context.run("x = 9007199254740992 until 9007199254740994; 1"),
        Err(SonoError::Runtime { message, .. }) if message.contains("not an exact whole number")
    );
    assert_matches!(
        context.run("0 until 1e12"),
        Err(SonoError::Runtime { message, .. }) if message.contains("exceeds the limit")
    );
    assert_matches!(context.run("0.5 until 3"), Err(SonoError::Runtime { .. }));
    assert_evaluates!(context, "try { 0 until 1e12 } catch \"too big\"" => "too big");
}

#[test]
fn blocks_and_top_level_values() {
    let mut context = context();
    assert_evaluates!(context,
        "{ 1; \"two\" }" => "[1, two]",
        "x = null" => "",
        "{ inner = 1 }; inner" => "RUNTIME ERROR: `inner` is not within scope at 1:16",
        "type 1" => "Number",
        "type (1, 2)" => "Vector",
        "type null" => "Null",
    );
}

#[test]
fn named_functions_return_values() {
    let mut context = context();
    assert_evaluates!(context,
        "square(x) => { return x * x }" => "<function/1>",
        "square(7)" => "49",
        "first(v) => { i in v do { i > 2 then return i }; return null }" => "<function/1>",
        "first((1, 5, 3))" => "5",
        "first((1, 2))" => "",
        "((a, b) => { return a - b })(5, 2)" => "3",
    );
}

#[test]
fn closures_keep_their_scope() {
    let mut context = context();
    context.execute("counter() => { var n = 0; return () => { n += 1; return n } }");
    assert_evaluates!(context,
        "c = counter(); c(); c(); c()" => "3",
        "d = counter(); d()" => "1",
        "c()" => "4",
    );
}

#[test]
fn parameters_by_reference_and_final() {
    let mut context = context();
    context.execute("inc(ref n) => { n += 1 }; bump(n) => { n += 1 }; fix(final n) => { n = 2 }");
    assert_evaluates!(context,
        "a = 1; inc(a); a" => "2",
        "b = 1; bump(b); b" => "1",
    );
    assert_matches!(context.run("fix(1)"), Err(SonoError::Immutable { .. }));
    assert_matches!(context.run("all = 1"), Err(SonoError::Immutable { .. }));
}

#[test]
fn arity_is_checked() {
    let mut context = context();
    context.execute("g(a) => { return a }");
    assert_evaluates!(context, "g()" => "");
    assert_matches!(
        context.run("g(1, 2)"),
        Err(SonoError::ArityMismatch { expected: 1, found: 2, .. })
    );
    assert_matches!(context.run("dict(1)"), Err(SonoError::ArityMismatch { expected: 0, .. }));
}

#[test]
fn errors_can_be_thrown_and_caught() {
    let mut context = context();
    assert_evaluates!(context,
        "try { throw \"oops\" } catch _e" => "oops",
        "try { 1 + \"a\" } catch _e" => "RUNTIME ERROR: cannot add Number and String at 1:9",
        "try { throw \"x\" } catch (\"caught \" + _e)" => "caught x",
        "try { 1 }" => "[1]",
        "try { throw \"y\" }" => "",
        "throw \"bad\"" => "RUNTIME ERROR: bad at 1:1",
        "nope" => "RUNTIME ERROR: `nope` is not within scope at 1:1",
    );
}

#[test]
fn compilation_errors_abort_the_whole_unit() {
    let mut context = context();
    assert_evaluates!(context,
        "(1 + 2" => "COMPILATION ERROR: unmatched `(` at 1:1",
        "ran = 1; (" => "COMPILATION ERROR: unmatched `(` at 1:10",
    );
    assert_eq!(context.get("ran"), None);
    assert_matches!(context.run("try { ) } catch _e"), Err(SonoError::UnmatchedBracket { .. }));
}

#[test]
fn structures_use_their_hooks() {
    let mut context = context();
    context.execute(
        "struct Point class {
            x = 0;
            y = 0;
            init(a, b) => { x = a; y = b }
            getStr() => { return \"(\" + str x + \" \" + str y + \")\" }
            equals(other) => { return x == other.x && y == other.y }
            getLen() => { return 2 }
            getIndex(i) => { return i == 0 then x else y }
            shift(d) => { x += d; return this }
        }",
    );
    assert_evaluates!(context,
        "p = new Point(3, 4); str p" => "(3 4)",
        "p.x" => "3",
        "len p" => "2",
        "p[1]" => "4",
        "p == new Point(3, 4)" => "true",
        "p != new Point(4, 3)" => "true",
        "p.shift(2); p.x" => "5",
        "p.x = 9; p" => "(9 4)",
        "x" => "RUNTIME ERROR: `x` is not within scope at 1:1",
        "type p" => "Structure",
    );
    assert_matches!(context.run("new Point(1, 2, 3)"), Err(SonoError::ArityMismatch { .. }));
}

#[test]
fn methods_do_not_keep_their_instance_alive() {
    let mut context = context();
    context.execute("struct Counter class { n = 0; bump() => { n += 1; return this } }");
    assert_evaluates!(context,
        "c = new Counter; c.bump().bump().n" => "2",
        "(new Counter).bump().n" => "1",
        "b = c.bump; b(); c.n" => "3",
    );
    assert_matches!(
        context.run("f = (new Counter).bump; f()"),
        Err(SonoError::Runtime { message, .. }) if message.contains("released")
    );
}

#[test]
fn structures_without_init_take_no_arguments() {
    let mut context = context();
    context.execute("struct Empty class { }");
    assert_matches!(context.run("new Empty(1)"), Err(SonoError::ArityMismatch { expected: 0, .. }));
    assert_evaluates!(context, "e = new Empty; type e" => "Structure");
}

#[test]
fn static_structures_are_singletons() {
    let mut context = context();
    assert_evaluates!(context,
        "static Settings class { name = \"sono\"; count = 1 }; Settings.name" => "sono",
        "Settings.count += 1; Settings.count" => "2",
    );
    assert_matches!(
        context.run("new Settings"),
        Err(SonoError::Runtime { message, .. }) if message == "static structure Settings cannot be instantiated"
    );
}

#[test]
fn prototypes_extend_value_kinds() {
    let mut context = context();
    context.execute("Vector.sum = (v) => { t = 0; x in v do { t += x }; return t }");
    context.execute("Number.double = (n) => { return n * 2 }");
    assert_evaluates!(context,
        "(1, 2, 3).sum()" => "6",
        "w = (4, 5); w.sum()" => "9",
        "21.double()" => "42",
        "(1, 2).length()" => "2",
        "Vector" => "Vector",
    );
    assert_matches!(context.run("\"a\".sum()"), Err(SonoError::UnresolvedVariable { .. }));
}

#[test]
fn spawned_work_is_joined() {
    let mut context = context();
    assert_evaluates!(context,
        "w = spawn((a, b) => { return a * b }, 6, 7); join(w)" => "42",
        "f = spawn(() => { throw \"inside\" }); try { join(f) } catch _e" => "inside",
    );
    assert_matches!(
        context.run("join(w)"),
        Err(SonoError::Runtime { message, .. }) if message == "thread has already been joined"
    );
}

#[test]
fn a_running_loop_can_be_cancelled() {
    let mut context = context();
    let cancellation = context.cancellation();
    let canceller = thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        cancellation.cancel();
    });
    assert_eq!(context.execute("true do { 1 }"), "Evaluation cancelled");
    canceller.join().unwrap();
    assert_evaluates!(context, "try { 2 }" => "[2]");
}

proptest! {
    #[test]
    fn assigned_variables_read_back(a in "[a-z]{1,8}", value in 0u32..1000) {
        assume_identifier!(a);
        let mut context = context();
        prop_assert_eq!(context.execute(&format!("{} = {}; {}", a, value, a)), value.to_string());
    }

    #[test]
    fn parameters_shadow_globals(a in "[a-z]{1,8}", b in "[a-z]{1,8}") {
        assume_identifiers!(a, b);
        prop_assume!(a != b);
        let mut context = context();
        let script = format!("{a} = 1; {b}({a}) => {{ return {a} + 1 }}; {b}(10) + {a}", a = a, b = b);
        prop_assert_eq!(context.execute(&script), "12");
    }
}
