// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! End-to-end tests: link, check and run Lyra programs.

use lyra_interp::{Interpreter, RuntimeDiagnostic, RuntimeError, TestSuites, Value};
use lyra_linker::{link, LinkedProgram, MemoryLoader};
use lyra_types::TypeChecker;

fn linked(loader: MemoryLoader, src: &str) -> LinkedProgram {
    link("main.lyra", src, loader).expect("program should link")
}

/// Check and run `src`; returns the interpreter and everything it printed.
fn run_with(loader: MemoryLoader, src: &str) -> (Interpreter, String) {
    let program = linked(loader, src);
    if let Err(e) = TypeChecker::check(&program) {
        panic!("expected program to check, got: {}", e);
    }
    let (mut interp, output) = Interpreter::with_captured_output();
    if let Err(e) = interp.run(&program) {
        panic!("runtime error: {}", e);
    }
    let printed = output.lock().unwrap().clone();
    (interp, printed)
}

fn run(src: &str) -> (Interpreter, String) {
    run_with(MemoryLoader::new(), src)
}

/// Run without type checking, for programs that fail at runtime.
fn run_unchecked(src: &str) -> Result<Value, RuntimeDiagnostic> {
    let program = linked(MemoryLoader::new(), src);
    let (mut interp, _) = Interpreter::with_captured_output();
    interp.run(&program)
}

/// Run a program the checker rejects but the interpreter executes.
fn run_rejected(src: &str) -> Interpreter {
    let program = linked(MemoryLoader::new(), src);
    assert!(TypeChecker::check(&program).is_err(), "expected the checker to reject the program");
    let (mut interp, _) = Interpreter::with_captured_output();
    if let Err(e) = interp.run(&program) {
        panic!("runtime error: {}", e);
    }
    interp
}

fn global(interp: &Interpreter, name: &str) -> Value {
    interp.global(name).unwrap_or_else(|| panic!("no global '{}'", name))
}

fn number(interp: &Interpreter, name: &str) -> f64 {
    match global(interp, name) {
        Value::Number(n) => n,
        other => panic!("'{}' is {:?}, not a number", name, other),
    }
}

fn string(interp: &Interpreter, name: &str) -> String {
    match global(interp, name) {
        Value::String(s) => s,
        other => panic!("'{}' is {:?}, not a string", name, other),
    }
}

#[test]
fn arithmetic() {
    let (interp, _) = run("let x = 2 + 3;");
    assert_eq!(number(&interp, "x"), 5.0);
}

#[test]
fn string_concatenation() {
    let (interp, _) = run("let s = \"a\" + 1;\nlet t = 1.5 + \"b\";");
    assert_eq!(string(&interp, "s"), "a1");
    assert_eq!(string(&interp, "t"), "1.5b");
}

#[test]
fn counter_keeps_state_between_calls() {
    let (interp, _) = run("class Counter {
            private count: number = 0;
            public inc(): number {
                count = count + 1;
                return count;
            }
        }
        let c = new Counter();
        let a = c.inc();
        let b = c.inc();");
    assert_eq!(number(&interp, "a"), 1.0);
    assert_eq!(number(&interp, "b"), 2.0);
    let Value::Object(counter) = global(&interp, "c") else { panic!("c is not an object") };
    assert!(matches!(counter.borrow().field("count"), Some(Value::Number(n)) if n == 2.0));
}

#[test]
fn fields_shadow_top_level_variables_inside_methods() {
    let (interp, _) = run("let count = \"x\";
        class Counter {
            private count: number = 0;
            public inc(): number {
                count = count + 1;
                return count;
            }
        }
        let c = new Counter();
        let first = c.inc();
        let second = c.inc();");
    assert_eq!(number(&interp, "first"), 1.0);
    assert_eq!(number(&interp, "second"), 2.0);
    assert_eq!(string(&interp, "count"), "x");
}

#[test]
fn foreach_returns_early() {
    let (interp, printed) = run("class Finder {
            public first(items: Array<number>): number {
                foreach (n in items) {
                    print(n);
                    if (n > 1) {
                        return n;
                    }
                }
                return -1;
            }
        }
        let f = new Finder();
        let found = f.first([1, 2, 3]);
        let none = f.first([0, 1]);");
    assert_eq!(number(&interp, "found"), 2.0);
    assert_eq!(number(&interp, "none"), -1.0);
    assert_eq!(printed, "1\n2\n0\n1\n");
}

#[test]
fn system_output() {
    let (_, printed) = run("import System;
        System.print(\"hello\");
        System.write(\"a\");
        System.write(\"b\");
        print(\"!\");");
    assert_eq!(printed, "hello\nab!\n");
}

#[test]
fn static_fields_are_copied_into_each_instance() {
    let (interp, _) = run("class Tally {
            public static total: number = 0;
            public bump(): number {
                total = total + 1;
                return total;
            }
        }
        let a = new Tally();
        a.bump();
        let fromA = a.bump();
        let b = new Tally();
        let fromB = b.bump();
        Tally.total = 10;
        let c = new Tally();
        let fromC = c.bump();
        let shared = Tally.total;");
    assert_eq!(number(&interp, "fromA"), 2.0);
    assert_eq!(number(&interp, "fromB"), 1.0);
    assert_eq!(number(&interp, "fromC"), 11.0);
    assert_eq!(number(&interp, "shared"), 10.0);
}

#[test]
fn inheritance_and_super_calls() {
    let (interp, _) = run("class Animal {
            public name: string;
            public constructor(name: string) {
                this.name = name;
            }
            public describe(): string {
                return \"animal \" + name;
            }
        }
        class Dog extends Animal {
            public constructor(name: string) {
                super(name);
            }
            public describe(): string {
                return super.describe() + \" (dog)\";
            }
        }
        class Puppy extends Dog {
            public constructor(name: string) {
                super(name);
            }
            public describe(): string {
                return super.describe() + \"!\";
            }
        }
        let d = new Dog(\"Rex\");
        let dog = d.describe();
        let p = new Puppy(\"Bit\");
        let puppy = p.describe();
        let pname = p.name;");
    assert_eq!(string(&interp, "dog"), "animal Rex (dog)");
    assert_eq!(string(&interp, "puppy"), "animal Bit (dog)!");
    assert_eq!(string(&interp, "pname"), "Bit");
}

#[test]
fn constructors_are_not_inherited() {
    let (interp, _) = run("class Base {
            public name: string = \"none\";
            public constructor(name: string) {
                this.name = name;
            }
        }
        class Child extends Base { }
        let c = new Child(\"ignored\");
        let name = c.name;");
    assert_eq!(string(&interp, "name"), "none");
}

#[test]
fn cyclic_superclasses_terminate() {
    let err = run_unchecked("class A extends B { }
        class B extends A { }
        let a = new A();
        a.missing();")
    .unwrap_err();
    assert!(
        matches!(err.error, RuntimeError::NoSuchMethod { ref class, ref method } if class == "A" && method == "missing"),
        "got {:?}",
        err
    );
}

#[test]
fn interfaces_and_typed_arrays() {
    let (interp, _) = run("interface Shape {
            area(): number;
        }
        class Square implements Shape {
            private side: number;
            public constructor(side: number) {
                this.side = side;
            }
            public area(): number {
                return side * side;
            }
        }
        let shapes: Array<Shape> = [new Square(2), new Square(3)];
        let total = 0;
        foreach (s in shapes) {
            total = total + s.area();
        }");
    assert_eq!(number(&interp, "total"), 13.0);
}

/// The checker only iterates arrays; the interpreter drives any object
/// with an `iterator()` method.
#[test]
fn user_defined_iterable() {
    let interp = run_rejected("class Range implements Iterable<number> {
            private limit: number;
            public constructor(limit: number) {
                this.limit = limit;
            }
            public iterator(): Iterator<number> {
                return new RangeIterator(limit);
            }
        }
        class RangeIterator implements Iterator<number> {
            private limit: number;
            private position: number = 0;
            public constructor(limit: number) {
                this.limit = limit;
            }
            public current(): number {
                return position;
            }
            public key(): mixed {
                return position;
            }
            public next(): void {
                position = position + 1;
            }
            public rewind(): void {
                position = 0;
            }
            public hasNext(): boolean {
                return position < limit;
            }
        }
        let sum = 0;
        foreach (i in new Range(4)) {
            sum = sum + i;
        }");
    assert_eq!(number(&interp, "sum"), 6.0);
}

#[test]
fn lambdas_capture_their_environment() {
    let (interp, _) = run("let base = 10;
        let add = (x: number): number => x + base;
        let r = add(5);
        base = 20;
        let later = add(5);");
    assert_eq!(number(&interp, "r"), 15.0);
    assert_eq!(number(&interp, "later"), 25.0);
}

#[test]
fn match_takes_first_matching_case() {
    let (interp, _) = run("let n = 2;
        let label = \"none\";
        match (n) {
            case 1 { label = \"one\"; }
            case 2 { label = \"two\"; }
            default { label = \"many\"; }
        }
        let m = 7;
        let other = \"none\";
        match (m) {
            case 1 { other = \"one\"; }
            default { other = \"many\"; }
        }");
    assert_eq!(string(&interp, "label"), "two");
    assert_eq!(string(&interp, "other"), "many");
}

#[test]
fn primitives_are_autoboxed() {
    let (interp, _) = run("let upper = \"abc\".toUpperCase();
        let rounded = 2.5.round();
        let len = \"hello\".length();
        let text = true.toString();");
    assert_eq!(string(&interp, "upper"), "ABC");
    assert_eq!(number(&interp, "rounded"), 3.0);
    assert_eq!(number(&interp, "len"), 5.0);
    assert_eq!(string(&interp, "text"), "true");
}

#[test]
fn arrays() {
    let (interp, _) = run("let a = [1, 2];
        a.push(3);
        a[1] = 5;
        let len = a.length();
        let first = a[0];
        let joined = a.join(\"-\");
        let parts = \"x,y\".split(\",\");
        let second = parts.get(1);");
    assert_eq!(number(&interp, "len"), 3.0);
    assert_eq!(number(&interp, "first"), 1.0);
    assert_eq!(string(&interp, "joined"), "1-5-3");
    assert_eq!(string(&interp, "second"), "y");
}

#[test]
fn default_arguments() {
    let (interp, _) = run("class Greeter {
            public greet(name: string = \"world\"): string {
                return \"hi \" + name;
            }
        }
        let g = new Greeter();
        let plain = g.greet();
        let named = g.greet(\"lyra\");
        let fixed = 3.14159.toFixed(2);");
    assert_eq!(string(&interp, "plain"), "hi world");
    assert_eq!(string(&interp, "named"), "hi lyra");
    assert_eq!(string(&interp, "fixed"), "3.14");
}

#[test]
fn static_methods() {
    let (interp, _) = run("class MathUtil {
            public static square(x: number): number {
                return x * x;
            }
        }
        let nine = MathUtil.square(3);
        let parsed = Number.parse(\"12\");");
    assert_eq!(number(&interp, "nine"), 9.0);
    assert_eq!(number(&interp, "parsed"), 12.0);
}

#[test]
fn classes_from_dependencies() {
    let loader = MemoryLoader::new().with(
        "shapes.lyra",
        "class Circle {
            public r: number;
            public constructor(r: number) { this.r = r; }
            public diameter(): number { return r * 2; }
        }",
    );
    let (interp, _) = run_with(loader, "import { Circle } from \"./shapes.lyra\";
        let c = new Circle(4);
        let d = c.diameter();");
    assert_eq!(number(&interp, "d"), 8.0);
}

#[test]
fn first_declaration_of_a_class_wins() {
    let loader = MemoryLoader::new().with("dep.lyra", "class Foo { public v(): number { return 1; } }");
    let (interp, _) = run_with(loader, "import { Foo } from \"./dep.lyra\";
        class Foo { public v(): number { return 2; } }
        let f = new Foo();
        let r = f.v();");
    assert_eq!(number(&interp, "r"), 1.0);
}

#[test]
fn classes_are_not_hoisted() {
    let err = run_unchecked("let x = new Later();\nclass Later { }").unwrap_err();
    assert!(matches!(err.error, RuntimeError::UnknownClass(ref name) if name == "Later"), "got {:?}", err);
}

#[test]
fn runtime_errors_carry_spans() {
    let src = "let a = [1];\nlet b = a[5];";
    let err = run_unchecked(src).unwrap_err();
    assert!(matches!(err.error, RuntimeError::IndexOutOfBounds { len: 1, .. }), "got {:?}", err);
    assert_eq!(&src[err.span.start..err.span.end], "a[5]");

    let err = run_unchecked("let a = missing;").unwrap_err();
    assert!(matches!(err.error, RuntimeError::Undefined(ref name) if name == "missing"));
}

#[test]
fn failed_assertions_abort_the_run() {
    let err = run_unchecked("import Assert;\nAssert.isTrue(false);").unwrap_err();
    assert_eq!(err.to_string(), "assertion failed: expected true but got false");
}

#[test]
fn top_level_return_is_loosely_cast() {
    let value = run_unchecked("return \"42\";").unwrap();
    assert!(matches!(value, Value::Number(n) if n == 42.0));
    let value = run_unchecked("let x = 1;").unwrap();
    assert!(matches!(value, Value::Null));
}

const SUITE: &str = "import Assert;
    class MathTest {
        @test
        public addition(): void {
            Assert.equals(4, 2 + 2);
        }
        @test
        public wrong(): void {
            Assert.equals(5, 2 + 2);
        }
        public helper(): void { }
    }
    class OtherTest {
        @test
        public strings(): void {
            Assert.equals(\"ab\", \"a\" + \"b\");
        }
    }";

#[test]
fn test_suites_report_each_test() {
    let program = linked(MemoryLoader::new(), SUITE);
    TypeChecker::check(&program).expect("suite should check");
    let (interp, _) = Interpreter::with_captured_output();
    let results = TestSuites::new(interp).execute(&program).expect("suite should run");

    let names: Vec<_> = results.iter().map(|r| r.name()).collect();
    assert_eq!(names, ["MathTest.addition", "MathTest.wrong", "OtherTest.strings"]);
    assert!(results[0].passed);
    assert!(!results[1].passed);
    assert_eq!(results[1].message.as_deref(), Some("assertion failed: expected 5 but got 4"));
    assert!(results[2].passed);
}

#[test]
fn test_suites_filter_by_name() {
    let program = linked(MemoryLoader::new(), SUITE);
    let (interp, _) = Interpreter::with_captured_output();
    let results = TestSuites::new(interp).with_filter("Other").execute(&program).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].method, "strings");
}
