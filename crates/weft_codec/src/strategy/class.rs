use alloc::boxed::Box;
use alloc::format;
use core::any::Any;

use crate::format::ReadObjectResult;
use crate::info::{ArrayInfo, ClassInfo, ListOps, TypeDescriptor, TypeKey, TypeKind};
use crate::object::Obj;
use crate::registry::TypeRegistry;
use crate::strategy::Strategy;
use crate::{DeserializationContext, Error, Result, SerializationContext};

/// Name of the item count node of a list object.
const LIST_COUNT: &str = "$C";

fn check_assignable(registry: &TypeRegistry, runtime: TypeKey, declared: &TypeDescriptor) -> Result<()> {
    if registry.is_assignable(runtime, declared.key())? {
        Ok(())
    } else {
        Err(Error::mismatch(declared.type_path(), runtime.path()))
    }
}

/// What sits between the header and the tail of an object.
#[derive(Clone, Copy)]
enum Body<'a> {
    Members(&'a ClassInfo),
    List(&'a ArrayInfo, &'a ListOps),
}

impl<'a> Body<'a> {
    fn of(runtime: &'a TypeDescriptor) -> Result<Self> {
        match runtime.kind() {
            TypeKind::Class(info) => Ok(Self::Members(info)),
            TypeKind::Array(info) => match info.list_ops() {
                Some(ops) => Ok(Self::List(info, ops)),
                None => Err(Error::mismatch("class or list", runtime.type_path())),
            },
            _ => Err(Error::mismatch("class or list", runtime.type_path())),
        }
    }
}

fn write_items(ctx: &mut SerializationContext<'_>, info: &ArrayInfo, list: &dyn Any) -> Result<()> {
    let len = info
        .bounds(list)
        .and_then(|bounds| bounds.first().copied())
        .ok_or_else(|| Error::mismatch("list", "object"))?;
    ctx.write(LIST_COUNT, &len)?;
    for index in 0..len {
        let item = info
            .element_at(list, &[index])
            .ok_or_else(|| Error::malformed(format!("list item {index} vanished")))?;
        ctx.serialize_value(&format!("${index}"), info.element(), item)?;
    }
    Ok(())
}

// Items are read before the list is borrowed, they may refer back to it.
fn read_items(
    ctx: &mut DeserializationContext<'_>,
    info: &ArrayInfo,
    ops: &ListOps,
    list: &Obj,
) -> Result<()> {
    let count: usize = ctx.read(LIST_COUNT)?;
    for index in 0..count {
        let item = ctx.deserialize_value(&format!("${index}"), info.element())?;
        ops.push(&mut *list.try_borrow_any_mut()?, item)?;
    }
    Ok(())
}

// -----------------------------------------------------------------------------
// ClassStrategy

/// Shared objects, tracked by identity and written with their runtime type.
///
/// The first time an object is met it gets the next id and is written in
/// full: a header with its external type name and id, the members of its
/// runtime type, a tail. Every later occurrence is a reference to the id.
///
/// A `Vec<T>` behind a handle is a shared object too. Its body is the item
/// count `$C` followed by the items `$0`, `$1` and so on.
///
/// Readers register an object under its id before reading its members, so
/// members may refer back to it. The values handled here are always
/// [`Obj`] handles, a bare class value is a [`Error::TypeMismatch`].
#[derive(Debug, Default, Clone, Copy)]
pub struct ClassStrategy;

impl Strategy for ClassStrategy {
    #[inline]
    fn name(&self) -> &str {
        "class"
    }

    fn can_handle(&self, ty: &TypeDescriptor) -> bool {
        matches!(ty.kind(), TypeKind::Class(_) | TypeKind::Abstract)
    }

    fn serialize(
        &self,
        ctx: &mut SerializationContext<'_>,
        name: &str,
        declared: &TypeDescriptor,
        value: Option<&dyn Any>,
    ) -> Result<()> {
        let Some(value) = value else {
            return ctx.writer().write_null(name);
        };
        let obj = value
            .downcast_ref::<Obj>()
            .ok_or_else(|| Error::mismatch("object handle", declared.type_path()))?;

        let runtime = ctx.registry().describe(obj.key())?;
        let body = Body::of(&runtime)?;
        check_assignable(ctx.registry(), obj.key(), declared)?;

        if let Some(id) = ctx.object_id(obj) {
            return ctx.writer().write_object_reference(name, id);
        }
        let id = ctx.register_object(obj)?;
        let type_name = ctx.names().type_to_name(&runtime)?;
        ctx.writer().write_object_header(name, &type_name, id)?;
        {
            let guard = obj.try_borrow_any()?;
            match body {
                Body::Members(_) => ctx.serialize_body(&runtime, &*guard)?,
                Body::List(info, _) => write_items(ctx, info, &*guard)?,
            }
        }
        ctx.writer().write_object_tail()
    }

    fn deserialize(
        &self,
        ctx: &mut DeserializationContext<'_>,
        name: &str,
        declared: &TypeDescriptor,
    ) -> Result<Option<Box<dyn Any>>> {
        let (type_name, id) = match ctx.reader().read_object_header(name)? {
            ReadObjectResult::Null => return Ok(None),
            ReadObjectResult::Reference(id) => {
                let obj = ctx.object(id)?;
                check_assignable(ctx.registry(), obj.key(), declared)?;
                return Ok(Some(Box::new(obj) as Box<dyn Any>));
            }
            ReadObjectResult::Object { type_name, id } => (type_name, id),
        };

        let key = ctx.names().name_to_type(&type_name)?;
        let runtime = ctx.registry().describe(key)?;
        let body = Body::of(&runtime)?;
        check_assignable(ctx.registry(), key, declared)?;

        let obj = match body {
            Body::Members(info) => info.create(ctx)?,
            Body::List(_, ops) => ops.create(),
        };
        if obj.key() != key {
            return Err(Error::mismatch(key.path(), obj.type_path()));
        }
        ctx.register_object(id, obj.clone())?;
        match body {
            Body::Members(_) => {
                let mut guard = obj.try_borrow_any_mut()?;
                ctx.deserialize_body(&runtime, &mut *guard)?;
            }
            Body::List(info, ops) => read_items(ctx, info, ops, &obj)?,
        }
        ctx.reader().read_object_tail()?;
        Ok(Some(Box::new(obj) as Box<dyn Any>))
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::vec;
    use alloc::vec::Vec;
    use core::any::Any;

    use weft_codec_derive::Describe;

    use crate::format::Primitive;
    use crate::format::tokens::{Token, TokenReader, TokenWriter};
    use crate::info::{ClassInfo, TypeDescriptor};
    use crate::object::{Obj, Ref};
    use crate::registry::TypeRegistry;
    use crate::strategy::{MemberStrategy, StrategyProvider, ValueStrategy};
    use crate::{DeserializationContext, Error, Result, SerializationContext, Serializer};

    #[derive(Describe, Default)]
    #[describe(class)]
    struct Node {
        name: String,
        next: Option<Ref<Node>>,
    }

    #[derive(Describe, Default)]
    #[describe(class)]
    struct Leaf {
        value: i32,
    }

    #[derive(Describe)]
    struct Pair {
        left: Ref<Leaf>,
        right: Ref<Leaf>,
    }

    impl Default for Pair {
        fn default() -> Self {
            let leaf = Ref::new(Leaf::default());
            Self { left: leaf.clone(), right: leaf }
        }
    }

    trait Shape {}
    crate::describe_abstract!(dyn Shape => "Shape");

    #[derive(Describe, Default)]
    #[describe(class, base = dyn Shape)]
    struct Circle {
        radius: f64,
    }

    #[derive(Describe, Default)]
    #[describe(class, alias = "Shapes.Square", base = dyn Shape)]
    struct Square {
        side: f64,
    }

    #[derive(Describe, Default)]
    struct Scene {
        shapes: Vec<Option<Ref<dyn Shape>>>,
    }

    /// Writes a tag ahead of the members.
    #[derive(Default)]
    struct Tagged;

    impl MemberStrategy for Tagged {
        fn serialize_members(
            &self,
            ctx: &mut SerializationContext<'_>,
            ty: &TypeDescriptor,
            value: &dyn Any,
        ) -> Result<()> {
            ctx.write("tag", &String::from("tagged"))?;
            ctx.serialize_members(ty, value)
        }

        fn deserialize_members(
            &self,
            ctx: &mut DeserializationContext<'_>,
            ty: &TypeDescriptor,
            target: &mut dyn Any,
        ) -> Result<()> {
            let tag: String = ctx.read("tag")?;
            if tag != "tagged" {
                return Err(Error::malformed("missing tag"));
            }
            ctx.deserialize_members(ty, target)
        }
    }

    #[derive(Describe, Default)]
    #[describe(class, base = dyn Shape, members = Tagged)]
    struct Blob {
        size: i32,
    }

    #[derive(Describe, Default)]
    struct Holder {
        direct: Option<Ref<Blob>>,
        poly: Option<Ref<dyn Shape>>,
    }

    #[derive(Default)]
    struct Marked;

    impl crate::Describe for Marked {
        fn describe() -> TypeDescriptor {
            TypeDescriptor::class::<Self>("Marked", ClassInfo::new::<Self>([]))
                .with_strategy::<ValueStrategy>()
        }
    }

    #[derive(Describe)]
    #[describe(class, factory = fresh_counter)]
    struct Counter {
        hits: u32,
        #[describe(skip)]
        origin: i32,
    }

    fn fresh_counter(_: &DeserializationContext<'_>) -> Result<Counter> {
        Ok(Counter { hits: 0, origin: 42 })
    }

    #[derive(Describe, Default)]
    #[describe(class, serialize_with = write_badge, deserialize_with = read_badge)]
    struct Badge {
        label: String,
        owner: Option<Ref<Badge>>,
    }

    fn write_badge(badge: &Badge, ctx: &mut SerializationContext<'_>) -> Result<()> {
        ctx.write("text", &badge.label)?.write("self", &badge.owner)?;
        Ok(())
    }

    fn read_badge(badge: &mut Badge, ctx: &mut DeserializationContext<'_>) -> Result<()> {
        badge.label = ctx.read("text")?;
        badge.owner = ctx.read("self")?;
        Ok(())
    }

    #[derive(Describe, Default)]
    #[describe(class)]
    struct Parent {
        child: Option<Ref<Child>>,
    }

    #[derive(Describe, Default)]
    #[describe(class)]
    struct Child {
        parent: Option<Ref<Parent>>,
    }

    type Leaves = Ref<Vec<Ref<Leaf>>>;

    #[derive(Describe, Default)]
    struct Board {
        first: Option<Leaves>,
        second: Option<Leaves>,
    }

    /// Counts the shapes it writes.
    struct Numbered;

    impl MemberStrategy for Numbered {
        fn serialize_members(
            &self,
            ctx: &mut SerializationContext<'_>,
            ty: &TypeDescriptor,
            value: &dyn Any,
        ) -> Result<()> {
            let seen = ctx.object_count();
            ctx.write("seen", &seen)?;
            ctx.serialize_members(ty, value)
        }

        fn deserialize_members(
            &self,
            ctx: &mut DeserializationContext<'_>,
            ty: &TypeDescriptor,
            target: &mut dyn Any,
        ) -> Result<()> {
            ctx.reader().skip("seen")?;
            ctx.deserialize_members(ty, target)
        }
    }

    fn serializer() -> Serializer {
        let mut registry = TypeRegistry::new();
        registry.register::<Node>().unwrap();
        registry.register::<Pair>().unwrap();
        registry.register::<Scene>().unwrap();
        registry.register::<Circle>().unwrap();
        registry.register::<Square>().unwrap();
        Serializer::new(registry)
    }

    fn start() -> Token {
        Token::Start { format_version: crate::format::FORMAT_VERSION, data_version: 0 }
    }

    fn shape<T: crate::Describe>(value: T) -> Option<Ref<dyn Shape>> {
        Some(Ref::from_obj(Obj::new(value)))
    }

    #[test]
    fn self_cycle() {
        let serializer = serializer();
        let node = Ref::new(Node { name: "a".into(), next: None });
        node.borrow_mut().unwrap().next = Some(node.clone());

        let mut writer = TokenWriter::new();
        serializer.serialize(&mut writer, &node).unwrap();
        node.borrow_mut().unwrap().next = None;

        assert_eq!(
            writer.tokens(),
            [
                start(),
                Token::object("root", "Node", 0),
                Token::value("name", Primitive::Str("a".into())),
                Token::reference("next", 0),
                Token::ObjectEnd,
            ]
        );

        let mut reader = TokenReader::new(writer.into_tokens());
        let back: Ref<Node> = serializer.deserialize(&mut reader).unwrap();
        let next = back.borrow().unwrap().next.clone().unwrap();
        assert!(next.ptr_eq(&back));
        assert_eq!(back.borrow().unwrap().name, "a");

        back.borrow_mut().unwrap().next = None;
    }

    #[test]
    fn shared_objects_are_written_once() {
        let serializer = serializer();
        let pair = Pair::default();
        pair.left.borrow_mut().unwrap().value = 9;

        let mut writer = TokenWriter::new();
        serializer.serialize(&mut writer, &pair).unwrap();
        let references = writer
            .tokens()
            .iter()
            .filter(|token| matches!(token, Token::Reference { .. }))
            .count();
        assert_eq!(references, 1);
        assert_eq!(writer.tokens()[2], Token::object("left", "Leaf", 0));
        assert_eq!(writer.tokens()[5], Token::reference("right", 0));

        let mut reader = TokenReader::new(writer.into_tokens());
        let back: Pair = serializer.deserialize(&mut reader).unwrap();
        assert!(back.left.ptr_eq(&back.right));
        assert_eq!(back.right.borrow().unwrap().value, 9);
    }

    #[test]
    fn runtime_types_survive_abstract_members() {
        let serializer = serializer();
        let circle = shape(Circle { radius: 1.5 });
        let scene = Scene {
            shapes: vec![circle.clone(), None, shape(Square { side: 2.0 }), circle],
        };

        let mut writer = TokenWriter::new();
        serializer.serialize(&mut writer, &scene).unwrap();
        assert_eq!(writer.tokens()[3], Token::object("shapes[0]", "Circle", 0));
        assert_eq!(writer.tokens()[6], Token::null("shapes[1]"));
        assert_eq!(writer.tokens()[7], Token::object("shapes[2]", "Shapes.Square", 1));
        assert_eq!(writer.tokens()[10], Token::reference("shapes[3]", 0));

        let mut reader = TokenReader::new(writer.into_tokens());
        let back: Scene = serializer.deserialize(&mut reader).unwrap();
        let [Some(first), None, Some(second), Some(last)] = &back.shapes[..] else {
            panic!("unexpected shapes: {} entries", back.shapes.len());
        };
        assert_eq!(first.downcast::<Circle>().unwrap().borrow().unwrap().radius, 1.5);
        assert_eq!(second.downcast::<Square>().unwrap().borrow().unwrap().side, 2.0);
        assert!(second.downcast::<Circle>().is_none());
        assert!(last.ptr_eq(first));
    }

    #[test]
    fn untyped_handles_accept_any_class() {
        let serializer = serializer();
        let mut writer = TokenWriter::new();
        serializer.serialize(&mut writer, &Obj::new(Leaf { value: 3 })).unwrap();

        let mut reader = TokenReader::new(writer.into_tokens());
        let back: Obj = serializer.deserialize(&mut reader).unwrap();
        assert_eq!(back.borrow::<Leaf>().unwrap().value, 3);
    }

    #[test]
    fn unassignable_objects_are_rejected() {
        let serializer = serializer();

        let wrong = Ref::<Circle>::from_obj(Obj::new(Square::default()));
        let mut writer = TokenWriter::new();
        let err = serializer.serialize(&mut writer, &wrong).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));

        let mut writer = TokenWriter::new();
        serializer.serialize(&mut writer, &Ref::new(Square::default())).unwrap();
        let mut reader = TokenReader::new(writer.into_tokens());
        let err = serializer.deserialize::<Ref<Circle>, _>(&mut reader).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));
    }

    #[test]
    fn bare_class_values_are_rejected() {
        let mut writer = TokenWriter::new();
        let err = serializer().serialize(&mut writer, &Leaf::default()).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));
        assert!(writer.is_closed());
    }

    #[test]
    fn unknown_type_names_fail() {
        let mut reader = TokenReader::new([start(), Token::object("root", "Ghost", 0), Token::ObjectEnd]);
        let err = serializer().deserialize::<Obj, _>(&mut reader).unwrap_err();
        assert_eq!(err, Error::UnresolvedTypeName("Ghost".into()));
    }

    #[test]
    fn references_must_point_backwards() {
        let mut reader = TokenReader::new([start(), Token::reference("root", 3)]);
        let err = serializer().deserialize::<Obj, _>(&mut reader).unwrap_err();
        assert!(matches!(err, Error::MalformedStream(_)));
    }

    #[test]
    fn null_roots_are_errors_unless_optional() {
        let serializer = serializer();
        let mut reader = TokenReader::new([start(), Token::null("root")]);
        let err = serializer.deserialize::<Ref<Leaf>, _>(&mut reader).unwrap_err();
        assert!(matches!(err, Error::MalformedStream(_)));

        let mut reader = TokenReader::new([start(), Token::null("root")]);
        let back: Option<Ref<Leaf>> = serializer.deserialize(&mut reader).unwrap();
        assert!(back.is_none());
    }

    #[test]
    fn member_strategies_apply_to_runtime_types() {
        let mut registry = TypeRegistry::new();
        registry.register::<Holder>().unwrap();
        let serializer = Serializer::new(registry);
        let holder = Holder {
            direct: Some(Ref::new(Blob { size: 8 })),
            poly: shape(Blob { size: 8 }),
        };

        let mut writer = TokenWriter::new();
        serializer.serialize(&mut writer, &holder).unwrap();
        let tokens = writer.tokens();
        assert_eq!(tokens[2], Token::object("direct", "Blob", 0));
        assert_eq!(tokens[6], Token::object("poly", "Blob", 1));
        assert_eq!(tokens[3..6], tokens[7..10]);
        assert_eq!(tokens[3], Token::value("tag", Primitive::Str("tagged".into())));

        let mut reader = TokenReader::new(writer.into_tokens());
        let back: Holder = serializer.deserialize(&mut reader).unwrap();
        let poly = back.poly.unwrap().downcast::<Blob>().unwrap();
        assert_eq!(poly.borrow().unwrap().size, 8);
        assert_eq!(back.direct.unwrap().borrow().unwrap().size, 8);
    }

    #[test]
    fn object_types_cannot_carry_strategy_markers() {
        let mut writer = TokenWriter::new();
        let err = serializer().serialize(&mut writer, &Ref::new(Marked)).unwrap_err();
        assert!(matches!(err, Error::InvalidDescriptor { .. }));
    }

    #[test]
    fn factories_build_objects_before_members_are_read() {
        let mut registry = TypeRegistry::new();
        registry.register::<Counter>().unwrap();
        let serializer = Serializer::new(registry);

        let mut writer = TokenWriter::new();
        serializer.serialize(&mut writer, &Ref::new(Counter { hits: 5, origin: 1 })).unwrap();
        assert_eq!(writer.tokens().len(), 4);

        let mut reader = TokenReader::new(writer.into_tokens());
        let back: Ref<Counter> = serializer.deserialize(&mut reader).unwrap();
        let counter = back.borrow().unwrap();
        assert_eq!(counter.hits, 5);
        assert_eq!(counter.origin, 42);
    }

    #[test]
    fn class_hooks_run_under_identity_tracking() {
        let mut registry = TypeRegistry::new();
        registry.register::<Badge>().unwrap();
        let serializer = Serializer::new(registry);
        let badge = Ref::new(Badge { label: "ops".into(), owner: None });
        badge.borrow_mut().unwrap().owner = Some(badge.clone());

        let mut writer = TokenWriter::new();
        serializer.serialize(&mut writer, &badge).unwrap();
        badge.borrow_mut().unwrap().owner = None;
        assert_eq!(writer.tokens()[2], Token::value("text", Primitive::Str("ops".into())));
        assert_eq!(writer.tokens()[3], Token::reference("self", 0));

        let mut reader = TokenReader::new(writer.into_tokens());
        let back: Ref<Badge> = serializer.deserialize(&mut reader).unwrap();
        let owner = back.borrow().unwrap().owner.clone().unwrap();
        assert!(owner.ptr_eq(&back));
        assert_eq!(back.borrow().unwrap().label, "ops");
        back.borrow_mut().unwrap().owner = None;
    }

    #[test]
    fn overrides_follow_the_runtime_type() {
        let mut provider = StrategyProvider::new();
        provider.add_override::<Circle>(Numbered).unwrap();
        let serializer = serializer().with_provider(provider);
        let scene = Scene { shapes: vec![shape(Square { side: 1.0 }), shape(Circle { radius: 2.0 })] };

        let mut writer = TokenWriter::new();
        serializer.serialize(&mut writer, &scene).unwrap();
        assert_eq!(writer.tokens()[6], Token::object("shapes[1]", "Circle", 1));
        assert_eq!(writer.tokens()[7], Token::value("seen", Primitive::U64(2)));

        let mut reader = TokenReader::new(writer.into_tokens());
        let back: Scene = serializer.deserialize(&mut reader).unwrap();
        let circle = back.shapes[1].as_ref().unwrap().downcast::<Circle>().unwrap();
        assert_eq!(circle.borrow().unwrap().radius, 2.0);
    }

    #[test]
    fn two_object_cycle() {
        let mut registry = TypeRegistry::new();
        registry.register::<Parent>().unwrap();
        let serializer = Serializer::new(registry);
        let parent = Ref::new(Parent::default());
        let child = Ref::new(Child { parent: Some(parent.clone()) });
        parent.borrow_mut().unwrap().child = Some(child.clone());

        let mut writer = TokenWriter::new();
        serializer.serialize(&mut writer, &parent).unwrap();
        parent.borrow_mut().unwrap().child = None;
        let tokens = writer.tokens();
        assert_eq!(tokens[1], Token::object("root", "Parent", 0));
        assert_eq!(tokens[2], Token::object("child", "Child", 1));
        assert_eq!(tokens[3], Token::reference("parent", 0));

        let mut reader = TokenReader::new(writer.into_tokens());
        let back: Ref<Parent> = serializer.deserialize(&mut reader).unwrap();
        let child = back.borrow().unwrap().child.clone().unwrap();
        let parent = child.borrow().unwrap().parent.clone().unwrap();
        assert!(parent.ptr_eq(&back));
        back.borrow_mut().unwrap().child = None;
    }

    #[test]
    fn shared_lists_keep_their_identity() {
        let mut registry = TypeRegistry::new();
        registry.register_alias::<Vec<Ref<Leaf>>>("Leaves").unwrap();
        registry.register::<Board>().unwrap();
        let serializer = Serializer::new(registry);
        let leaf = Ref::new(Leaf { value: 7 });
        let list: Leaves = Ref::new(vec![leaf.clone(), leaf]);
        let board = Board { first: Some(list.clone()), second: Some(list) };

        let mut writer = TokenWriter::new();
        serializer.serialize(&mut writer, &board).unwrap();
        assert_eq!(
            writer.tokens()[2..],
            [
                Token::object("first", "Leaves", 0),
                Token::value("$C", Primitive::U64(2)),
                Token::object("$0", "Leaf", 1),
                Token::value("value", Primitive::I32(7)),
                Token::ObjectEnd,
                Token::reference("$1", 1),
                Token::ObjectEnd,
                Token::reference("second", 0),
                Token::StructEnd,
            ]
        );

        let mut reader = TokenReader::new(writer.into_tokens());
        let back: Board = serializer.deserialize(&mut reader).unwrap();
        let (first, second) = (back.first.unwrap(), back.second.unwrap());
        assert!(first.ptr_eq(&second));
        let items = first.borrow().unwrap();
        assert_eq!(items.len(), 2);
        assert!(items[0].ptr_eq(&items[1]));
        assert_eq!(items[1].borrow().unwrap().value, 7);
    }

    #[test]
    fn lists_may_contain_themselves() {
        let mut registry = TypeRegistry::new();
        registry.register_alias::<Vec<Obj>>("Bag").unwrap();
        let serializer = Serializer::new(registry);
        let bag = Obj::new(Vec::<Obj>::new());
        bag.borrow_mut::<Vec<Obj>>().unwrap().push(bag.clone());

        let mut writer = TokenWriter::new();
        serializer.serialize(&mut writer, &bag).unwrap();
        bag.borrow_mut::<Vec<Obj>>().unwrap().clear();
        assert_eq!(writer.tokens()[3], Token::reference("$0", 0));

        let mut reader = TokenReader::new(writer.into_tokens());
        let back: Obj = serializer.deserialize(&mut reader).unwrap();
        let first = back.borrow::<Vec<Obj>>().unwrap()[0].clone();
        assert!(first.ptr_eq(&back));
        back.borrow_mut::<Vec<Obj>>().unwrap().clear();
    }

    #[test]
    fn fixed_arrays_cannot_be_shared() {
        let mut writer = TokenWriter::new();
        let err = serializer().serialize(&mut writer, &Obj::new([1_u8, 2])).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));
    }
}
