// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! End-to-end checker tests over linked programs.

use lyra_linker::{link, MemoryLoader};
use lyra_types::{CheckedProgram, Type, TypeChecker, TypeError};

fn check_with(loader: MemoryLoader, src: &str) -> Result<CheckedProgram, TypeError> {
    let linked = link("main.lyra", src, loader).expect("program should link");
    TypeChecker::check(&linked)
}

fn check(src: &str) -> Result<CheckedProgram, TypeError> {
    check_with(MemoryLoader::new(), src)
}

fn ok(src: &str) -> CheckedProgram {
    match check(src) {
        Ok(checked) => checked,
        Err(e) => panic!("expected program to check, got: {}", e),
    }
}

fn err(src: &str) -> TypeError {
    match check(src) {
        Ok(_) => panic!("expected a type error"),
        Err(e) => e,
    }
}

fn global(checked: &CheckedProgram, name: &str) -> Type {
    checked.globals.get(name).cloned().unwrap_or_else(|| panic!("no global '{}'", name))
}

#[test]
fn annotated_arithmetic() {
    let checked = ok("let x: number = 2 + 3;");
    assert_eq!(global(&checked, "x"), Type::Number);
}

#[test]
fn string_plus_number_is_string() {
    let checked = ok("let s = \"a\" + 1;");
    assert_eq!(global(&checked, "s"), Type::String);
}

#[test]
fn invalid_arithmetic() {
    let e = err("let b = true - 1;");
    assert!(matches!(e, TypeError::InvalidBinary { op: "-", .. }), "got {:?}", e);
}

#[test]
fn any_arithmetic_with_a_string_is_string() {
    let checked = ok("let s = \"a\" - 1;\nlet t = 2 * \"b\";");
    assert_eq!(global(&checked, "s"), Type::String);
    assert_eq!(global(&checked, "t"), Type::String);
}

#[test]
fn equality_requires_left_to_accept_right() {
    let checked = ok("let a: number? = null;\nlet b = a == 1;");
    assert_eq!(global(&checked, "b"), Type::Boolean);

    let e = err("let a: number? = null;\nlet b = 1 == a;");
    assert!(matches!(e, TypeError::InvalidBinary { op: "==", .. }), "got {:?}", e);
}

#[test]
fn declared_type_mismatch() {
    let e = err("let n: number = \"text\";");
    assert_eq!(e.to_string(), "type mismatch: expected number, found string");
}

#[test]
fn counter_class() {
    let checked = ok("class Counter {
            private count: number = 0;
            public inc(): number {
                count = count + 1;
                return count;
            }
        }
        let c = new Counter();
        let a = c.inc();");
    assert_eq!(global(&checked, "a"), Type::Number);
    assert!(matches!(global(&checked, "c"), Type::Class { ref name, .. } if name == "Counter"));
}

#[test]
fn fields_shadow_top_level_variables_inside_methods() {
    ok("let count = \"x\";
        class Counter {
            private count: number = 0;
            public inc(): number {
                count = count + 1;
                return count;
            }
        }");

    let e = err("let count = \"x\";
        class Counter {
            public inc(): number {
                return count;
            }
        }");
    assert_eq!(e.to_string(), "type mismatch: expected number, found string");
}

#[test]
fn locals_shadow_fields() {
    ok("class Counter {
            private count: number = 0;
            public label(): string {
                let count = \"many\";
                return count;
            }
        }");
}

#[test]
fn first_declaration_of_a_class_wins() {
    let loader = MemoryLoader::new().with("dep.lyra", "class Foo { public v(): number { return 1; } }");
    let checked = check_with(
        loader,
        "import { Foo } from \"./dep.lyra\";
        class Foo { public v(): string { return \"two\"; } }
        let f = new Foo();
        let r = f.v();",
    )
    .expect("program should check");
    assert_eq!(global(&checked, "r"), Type::Number);
}

#[test]
fn missing_interface_method() {
    let e = err("interface Shape {
            area(): number;
            name(): string;
        }
        class Square implements Shape {
            public area(): number { return 4; }
        }");
    assert_eq!(e.to_string(), "class 'Square' does not implement method 'name' of interface 'Shape'");
}

#[test]
fn interface_from_a_dependency_declared_after_use() {
    let loader = MemoryLoader::new().with(
        "shapes.lyra",
        "interface Shape { area(): number; }",
    );
    let src = "import { Shape } from \"./shapes.lyra\";
        class Square implements Shape {
            public area(): number { return 4; }
        }
        let s: Shape = new Square();
        let a: number = s.area();";
    assert!(check_with(loader, src).is_ok());
}

#[test]
fn incompatible_implementation() {
    let e = err("interface Named { name(): string; }
        class Dog implements Named {
            public name(): number { return 1; }
        }");
    assert!(matches!(e, TypeError::IncompatibleImplementation { ref method, .. } if method == "name"), "got {:?}", e);
}

#[test]
fn private_method_of_unrelated_class() {
    let e = err("class B {
            private secret(): number { return 1; }
        }
        class A {
            public run(b: B): number { return b.secret(); }
        }");
    assert!(e.to_string().contains("cannot access private method"), "got: {}", e);
}

#[test]
fn private_members_reach_one_level_down() {
    ok("class A {
            private secret(): number { return 1; }
        }
        class B extends A {
            public run(): number { return this.secret(); }
        }");

    let e = err("class A {
            private secret(): number { return 1; }
        }
        class B extends A { }
        class C extends B {
            public run(): number { return this.secret(); }
        }");
    assert!(matches!(e, TypeError::Private { kind: "method", .. }), "got {:?}", e);
}

#[test]
fn nullable_types() {
    ok("let n: number? = null;
        n = 5;");

    let e = err("let s: string? = \"x\";
        s.length();");
    assert!(matches!(e, TypeError::NullableReceiver { .. }), "got {:?}", e);

    let e = err("let n: number = null;");
    assert!(matches!(e, TypeError::Mismatch { .. }), "got {:?}", e);
}

#[test]
fn generic_class() {
    let src = "class Box<T> {
            private value: T;
            public constructor(value: T) { this.value = value; }
            public get(): T { return value; }
        }";
    let checked = ok(&format!("{}\nlet b = new Box<number>(1);\nlet v = b.get();", src));
    assert_eq!(global(&checked, "v"), Type::Number);

    let e = err(&format!("{}\nlet b = new Box<number>(\"x\");", src));
    assert_eq!(e.to_string(), "type mismatch: expected number, found string");

    let e = err(&format!("{}\nlet b = new Box<number, string>(1);", src));
    assert!(matches!(e, TypeError::TypeArgumentCount { expected: 1, found: 2, .. }), "got {:?}", e);
}

#[test]
fn type_arguments_follow_the_declared_type() {
    let checked = ok("let items: Array<string> = new Array();
        let first = items.get(0);");
    assert_eq!(global(&checked, "first"), Type::String);
}

#[test]
fn unknown_superclass() {
    let e = err("class A extends Missing { }");
    assert_eq!(e.to_string(), "Unknown superclass 'Missing'");
}

#[test]
fn constructors_are_not_inherited() {
    let checked = ok("class Base {
            private id: number;
            public constructor(id: number) { this.id = id; }
            public getId(): number { return id; }
        }
        class Child extends Base {
            public label(): string { return \"child\"; }
        }
        let c = new Child(\"unchecked\");
        let id = c.getId();");
    assert_eq!(global(&checked, "id"), Type::Number);

    let e = err("class Base {
            public constructor(id: number) { }
        }
        class Mid extends Base { }
        class Leaf extends Mid {
            public constructor() { super(1); }
        }");
    assert!(matches!(e, TypeError::TooManyArguments { expected: 0, found: 1, .. }), "got {:?}", e);
}

#[test]
fn super_calls() {
    ok("class Base {
            public constructor(x: number) { }
            public describe(): string { return \"base\"; }
        }
        class Child extends Base {
            public constructor() { super(1); }
            public describe(): string { return super.describe() + \"!\"; }
        }");

    let e = err("class Lone {
            public constructor() { super(); }
        }");
    assert!(matches!(e, TypeError::SuperOutsideSubclass { .. }), "got {:?}", e);
}

#[test]
fn missing_return() {
    let e = err("class A { public f(): number { } }");
    assert!(matches!(e, TypeError::MissingReturn { ref method, .. } if method == "f"), "got {:?}", e);

    let e = err("class A { public f(): number { return; } }");
    assert_eq!(e.to_string(), "missing return value in 'f': expected number");

    let e = err("class A {
            public f(flag: boolean): number {
                if (flag) { return 1; }
            }
        }");
    assert!(matches!(e, TypeError::MissingReturn { .. }), "got {:?}", e);

    ok("class A {
            public f(flag: boolean): number {
                if (flag) { return 1; } else { return 2; }
            }
            public g(): number? { }
            public h(): void { }
        }");
}

#[test]
fn match_with_default_returns() {
    ok("class A {
            public f(n: number): string {
                match (n) {
                    case 1 { return \"one\"; }
                    default { return \"many\"; }
                }
            }
        }");
}

#[test]
fn readonly_fields() {
    let src = "class Point {
            public readonly x: number;
            public constructor(x: number) { this.x = x; }
            public move(): void { this.x = 2; }
        }";
    let e = err(src);
    assert_eq!(e.to_string(), "cannot assign to readonly field 'x'");

    ok("class Point {
            public readonly x: number;
            public constructor(x: number) { this.x = x; }
        }");
}

#[test]
fn lambdas() {
    let checked = ok("let inc = (x: number) => x + 1;
        let y: number = inc(2);");
    assert_eq!(global(&checked, "y"), Type::Number);

    let e = err("let f = () => { print(1); };");
    assert_eq!(e.to_string(), "lambda must have a return type");

    let e = err("let f = (): number => { };");
    assert!(matches!(e, TypeError::LambdaReturnType { .. }), "got {:?}", e);

    let e = err("let inc = (x: number): number => x + 1;
        inc(\"a\");");
    assert!(matches!(e, TypeError::Mismatch { .. }), "got {:?}", e);
}

#[test]
fn foreach_over_array() {
    ok("let total = 0;
        foreach (n in [1, 2, 3]) { total = total + n; }");

    let e = err("foreach (n in 5) { }");
    assert!(matches!(e, TypeError::NotIterable { .. }), "got {:?}", e);
}

#[test]
fn foreach_only_accepts_arrays() {
    let e = err("class Bag implements Iterable<number> {
            public iterator(): Iterator<number> { return [1].iterator(); }
        }
        foreach (x in new Bag()) { }");
    assert!(matches!(e, TypeError::NotIterable { .. }), "got {:?}", e);

    let e = err("let m: mixed = [1];\nforeach (x in m) { }");
    assert!(matches!(e, TypeError::NotIterable { .. }), "got {:?}", e);
}

#[test]
fn conditions_must_be_boolean() {
    let e = err("if (1) { }");
    assert!(matches!(e, TypeError::InvalidCondition { .. }), "got {:?}", e);
}

#[test]
fn array_elements_share_a_type() {
    let e = err("let xs = [1, \"two\"];");
    assert!(matches!(e, TypeError::ArrayElement { .. }), "got {:?}", e);
}

#[test]
fn primitive_methods_through_autobox() {
    let checked = ok("let u = \"abc\".toUpperCase();
        let n: number = \"abc\".length();
        let parts = \"a,b\".split(\",\");
        let first: string = parts.get(0);
        let r = 2.5.round();");
    assert_eq!(global(&checked, "u"), Type::String);
    assert_eq!(global(&checked, "r"), Type::Number);

    let e = err("\"abc\".nope();");
    assert!(e.to_string().starts_with("unknown method 'nope'"), "got: {}", e);
}

#[test]
fn static_and_instance_calls() {
    ok("let n: number = Number.parse(\"12\");");

    let e = err("let n = 5;\nn.parse(\"1\");");
    assert!(matches!(e, TypeError::StaticAsInstance { .. }), "got {:?}", e);

    let e = err("String.length();");
    assert!(matches!(e, TypeError::InstanceAsStatic { .. }), "got {:?}", e);
}

#[test]
fn imported_natives() {
    ok("import System, Assert;
        System.print(\"hi\");
        Assert.equals(1, 1);");

    let e = err("System.print(\"hi\");");
    assert!(matches!(e, TypeError::Undefined { ref name, .. } if name == "System"), "got {:?}", e);
}

#[test]
fn call_arity() {
    let src = "class M {
            public static add(a: number, b: number = 1): number { return a + b; }
        }";
    ok(&format!("{}\nM.add(1);\nM.add(1, 2);", src));

    let e = err(&format!("{}\nM.add();", src));
    assert!(matches!(e, TypeError::MissingArgument { ref param, .. } if param == "a"), "got {:?}", e);

    let e = err(&format!("{}\nM.add(1, 2, 3);", src));
    assert!(matches!(e, TypeError::TooManyArguments { expected: 2, found: 3, .. }), "got {:?}", e);
}

#[test]
fn duplicate_members() {
    let e = err("class A {
            public f(): void { }
            public f(): void { }
        }");
    assert!(matches!(e, TypeError::DuplicateMember { ref member, .. } if member == "f"), "got {:?}", e);
}
