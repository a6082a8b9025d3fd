use alloc::format;
use alloc::string::String;
use alloc::sync::Arc;
use core::any::type_name;

use log::{debug, warn};

use crate::context::Tables;
use crate::format::{FORMAT_VERSION, FormatReader, FormatWriter};
use crate::info::Describe;
use crate::registry::{TypeNameResolver, TypeRegistry, ValueConverters};
use crate::strategy::StrategyProvider;
use crate::{DeserializationContext, Error, Result, SerializationContext};

// -----------------------------------------------------------------------------
// SerializerConfig

/// Settings of a [`Serializer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializerConfig {
    root_name: String,
    data_version: i32,
    max_depth: usize,
}

impl Default for SerializerConfig {
    fn default() -> Self {
        Self {
            root_name: String::from("root"),
            data_version: 0,
            max_depth: 512,
        }
    }
}

impl SerializerConfig {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Name of the top-level node. Defaults to `root`.
    pub fn with_root_name(mut self, name: impl Into<String>) -> Self {
        self.root_name = name.into();
        self
    }

    /// Application data version written to the stream. Defaults to 0.
    pub fn with_data_version(mut self, version: i32) -> Self {
        self.data_version = version;
        self
    }

    /// Deepest nesting of nodes accepted in either direction. Defaults to 512.
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    #[inline]
    pub fn root_name(&self) -> &str {
        &self.root_name
    }

    #[inline]
    pub fn data_version(&self) -> i32 {
        self.data_version
    }

    #[inline]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}

// -----------------------------------------------------------------------------
// Serializer

/// Entry point: writes and reads whole object graphs.
///
/// A serializer is cheap to clone and holds no per-operation state, so one
/// instance can serve any number of calls. Concurrent calls are safe as long
/// as each uses its own backend.
///
/// # Examples
///
/// ```
/// use weft_codec::format::tokens::{TokenReader, TokenWriter};
/// use weft_codec::registry::TypeRegistry;
/// use weft_codec::{Serializer, SerializerConfig};
///
/// let serializer = Serializer::new(TypeRegistry::new())
///     .with_config(SerializerConfig::new().with_data_version(3));
///
/// let mut writer = TokenWriter::new();
/// serializer.serialize(&mut writer, &vec![Some(1_u8), None]).unwrap();
///
/// let mut reader = TokenReader::new(writer.into_tokens());
/// let back: Vec<Option<u8>> = serializer.deserialize(&mut reader).unwrap();
/// assert_eq!(back, [Some(1), None]);
/// ```
#[derive(Clone)]
pub struct Serializer {
    registry: Arc<TypeRegistry>,
    provider: Arc<StrategyProvider>,
    converters: Arc<ValueConverters>,
    names: Option<Arc<dyn TypeNameResolver>>,
    config: SerializerConfig,
}

impl Serializer {
    /// A serializer with the built-in strategies and no value converters.
    pub fn new(registry: TypeRegistry) -> Self {
        Self::from_shared(Arc::new(registry))
    }

    pub fn from_shared(registry: Arc<TypeRegistry>) -> Self {
        Self {
            registry,
            provider: Arc::new(StrategyProvider::new()),
            converters: Arc::new(ValueConverters::new()),
            names: None,
            config: SerializerConfig::default(),
        }
    }

    pub fn with_provider(mut self, provider: impl Into<Arc<StrategyProvider>>) -> Self {
        self.provider = provider.into();
        self
    }

    pub fn with_converters(mut self, converters: impl Into<Arc<ValueConverters>>) -> Self {
        self.converters = converters.into();
        self
    }

    /// Replaces the registry as the source of written type names.
    pub fn with_names(mut self, names: Arc<dyn TypeNameResolver>) -> Self {
        self.names = Some(names);
        self
    }

    pub fn with_config(mut self, config: SerializerConfig) -> Self {
        self.config = config;
        self
    }

    #[inline]
    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    #[inline]
    pub fn provider(&self) -> &Arc<StrategyProvider> {
        &self.provider
    }

    #[inline]
    pub fn converters(&self) -> &Arc<ValueConverters> {
        &self.converters
    }

    #[inline]
    pub fn config(&self) -> &SerializerConfig {
        &self.config
    }

    fn tables(&self) -> Tables<'_> {
        let names: &dyn TypeNameResolver = match &self.names {
            Some(names) => &**names,
            None => &*self.registry,
        };
        Tables {
            registry: &self.registry,
            provider: &self.provider,
            converters: &self.converters,
            names,
        }
    }

    // -------------------------------------------------------------------------
    // Operations

    /// Writes `value` as the root node of a new stream.
    ///
    /// The writer is closed even when writing fails. The first error wins.
    pub fn serialize<T: Describe, W: FormatWriter>(&self, writer: &mut W, value: &T) -> Result<()> {
        debug!("serializing `{}`", type_name::<T>());
        let result = self.write_stream(writer, value);
        let closed = writer.close();
        finish(result, closed)
    }

    fn write_stream<T: Describe>(&self, writer: &mut dyn FormatWriter, value: &T) -> Result<()> {
        writer.initialize(FORMAT_VERSION, self.config.data_version)?;
        let mut ctx = SerializationContext::new(
            writer,
            self.tables(),
            self.config.data_version,
            self.config.max_depth,
        );
        ctx.write(&self.config.root_name, value)?;
        debug!("wrote {} objects", ctx.object_count());
        Ok(())
    }

    /// Reads the root node of a stream as a `T`.
    ///
    /// The reader is closed even when reading fails. The first error wins.
    pub fn deserialize<T: Describe, R: FormatReader>(&self, reader: &mut R) -> Result<T> {
        debug!("deserializing `{}`", type_name::<T>());
        let result = self.read_stream(reader);
        let closed = reader.close();
        finish(result, closed)
    }

    fn read_stream<T: Describe>(&self, reader: &mut dyn FormatReader) -> Result<T> {
        reader.initialize()?;
        if reader.format_version() != FORMAT_VERSION {
            return Err(Error::malformed(format!(
                "format version {} is not supported, expected {FORMAT_VERSION}",
                reader.format_version()
            )));
        }
        let mut ctx = DeserializationContext::new(reader, self.tables(), self.config.max_depth);
        let value = ctx.read::<T>(&self.config.root_name)?;
        debug!("read {} objects, data version {}", ctx.object_count(), ctx.data_version());
        Ok(value)
    }
}

fn finish<T>(result: Result<T>, closed: Result<()>) -> Result<T> {
    match (result, closed) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(err)) => Err(err),
        (Err(err), Ok(())) => Err(err),
        (Err(err), Err(close)) => {
            warn!("backend failed to close after an earlier error: {close}");
            Err(err)
        }
    }
}

impl core::fmt::Debug for Serializer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Serializer")
            .field("registry", &self.registry)
            .field("provider", &self.provider)
            .field("converters", &self.converters)
            .field("custom_names", &self.names.is_some())
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::string::String;
    use alloc::sync::Arc;
    use alloc::vec;
    use alloc::vec::Vec;
    use core::any::{Any, TypeId};

    use weft_codec_derive::Describe;

    use super::{Serializer, SerializerConfig, finish};
    use crate::format::tokens::{Token, TokenReader, TokenWriter};
    use crate::format::{FORMAT_VERSION, Primitive, PrimitiveKind, PrimitiveValue};
    use crate::info::TypeDescriptor;
    use crate::object::Ref;
    use crate::registry::{TypePathResolver, TypeRegistry};
    use crate::strategy::{Strategy, StrategyProvider};
    use crate::{DeserializationContext, Describe, Error, Result, SerializationContext};

    #[derive(Describe, Default, Debug, PartialEq)]
    #[describe(deserialize_with = read_versioned)]
    struct Versioned {
        value: u8,
        #[describe(skip)]
        seen: i32,
    }

    fn read_versioned(target: &mut Versioned, ctx: &mut DeserializationContext<'_>) -> Result<()> {
        target.seen = ctx.data_version();
        ctx.deserialize_members(&Versioned::describe(), target)
    }

    #[derive(Describe, Default, Debug, PartialEq)]
    #[describe(strategy = Millis)]
    struct Timeout {
        millis: u64,
    }

    #[derive(Describe, Default, Debug, PartialEq)]
    #[describe(class)]
    struct Job {
        label: String,
        timeout: Timeout,
    }

    #[derive(Describe, Default, Debug, PartialEq)]
    struct Wrapper<T> {
        inner: T,
    }

    /// Writes a `Timeout` as a bare number.
    #[derive(Default)]
    struct Millis;

    impl Strategy for Millis {
        fn name(&self) -> &str {
            "millis"
        }

        fn can_handle(&self, ty: &TypeDescriptor) -> bool {
            ty.id() == TypeId::of::<Timeout>()
        }

        fn serialize(
            &self,
            ctx: &mut SerializationContext<'_>,
            name: &str,
            _declared: &TypeDescriptor,
            value: Option<&dyn Any>,
        ) -> Result<()> {
            match value.and_then(|value| value.downcast_ref::<Timeout>()) {
                Some(timeout) => ctx.writer().write_value(name, &Primitive::U64(timeout.millis)),
                None => ctx.writer().write_null(name),
            }
        }

        fn deserialize(
            &self,
            ctx: &mut DeserializationContext<'_>,
            name: &str,
            _declared: &TypeDescriptor,
        ) -> Result<Option<Box<dyn Any>>> {
            match ctx.reader().read_value(name, PrimitiveKind::U64)? {
                None => Ok(None),
                Some(value) => {
                    let millis = u64::from_primitive(value)?;
                    Ok(Some(Box::new(Timeout { millis })))
                }
            }
        }
    }

    fn start(data_version: i32) -> Token {
        Token::Start { format_version: FORMAT_VERSION, data_version }
    }

    #[test]
    fn data_version_reaches_readers() {
        let serializer = Serializer::new(TypeRegistry::new())
            .with_config(SerializerConfig::new().with_data_version(7));
        let mut writer = TokenWriter::new();
        serializer.serialize(&mut writer, &Versioned { value: 1, seen: 0 }).unwrap();
        assert_eq!(writer.tokens()[0], start(7));

        let mut reader = TokenReader::new(writer.into_tokens());
        let back: Versioned = serializer.deserialize(&mut reader).unwrap();
        assert_eq!(back, Versioned { value: 1, seen: 7 });
    }

    #[test]
    fn unknown_format_versions_are_rejected() {
        let serializer = Serializer::new(TypeRegistry::new());
        let mut reader = TokenReader::new([
            Token::Start { format_version: FORMAT_VERSION + 1, data_version: 0 },
            Token::value("root", Primitive::U8(1)),
        ]);
        let err = serializer.deserialize::<u8, _>(&mut reader).unwrap_err();
        assert!(matches!(err, Error::MalformedStream(_)));
    }

    #[test]
    fn root_name_is_configurable() {
        let config = SerializerConfig::new().with_root_name("doc");
        let serializer = Serializer::new(TypeRegistry::new()).with_config(config);
        let mut writer = TokenWriter::new();
        serializer.serialize(&mut writer, &true).unwrap();
        assert_eq!(writer.tokens()[1], Token::value("doc", Primitive::Bool(true)));

        let mut reader = TokenReader::new(writer.into_tokens());
        assert!(Serializer::new(TypeRegistry::new()).deserialize::<bool, _>(&mut reader).is_err());
    }

    #[test]
    fn depth_is_limited_both_ways() {
        let nested = vec![vec![vec![1_u8]]];
        let shallow = Serializer::new(TypeRegistry::new())
            .with_config(SerializerConfig::new().with_max_depth(3));

        let mut writer = TokenWriter::new();
        let err = shallow.serialize(&mut writer, &nested).unwrap_err();
        assert_eq!(err, Error::DepthLimitExceeded { limit: 3 });

        let mut writer = TokenWriter::new();
        let nullable = vec![Some(vec![Some(1_u8)])];
        shallow.serialize(&mut writer, &nullable).unwrap();

        let mut writer = TokenWriter::new();
        Serializer::new(TypeRegistry::new()).serialize(&mut writer, &nested).unwrap();
        let mut reader = TokenReader::new(writer.into_tokens());
        let err = shallow.deserialize::<Vec<Vec<Vec<u8>>>, _>(&mut reader).unwrap_err();
        assert_eq!(err, Error::DepthLimitExceeded { limit: 3 });
    }

    #[test]
    fn marker_strategies_take_precedence() {
        let mut registry = TypeRegistry::new();
        registry.register::<Job>().unwrap();
        let serializer = Serializer::new(registry);
        let job = Ref::new(Job { label: "build".into(), timeout: Timeout { millis: 1500 } });

        let mut writer = TokenWriter::new();
        serializer.serialize(&mut writer, &job).unwrap();
        assert_eq!(writer.tokens()[3], Token::value("timeout", Primitive::U64(1500)));

        let mut reader = TokenReader::new(writer.into_tokens());
        let back: Ref<Job> = serializer.deserialize(&mut reader).unwrap();
        assert_eq!(back.borrow().unwrap().timeout, Timeout { millis: 1500 });
    }

    #[test]
    fn custom_strategies_come_before_builtins() {
        let mut provider = StrategyProvider::new();
        provider.add_strategy(Millis).unwrap();
        assert!(matches!(provider.add_strategy(Millis), Err(Error::DuplicateRegistration(_))));
        assert_eq!(provider.strategies().next().map(|s| s.name()), Some("millis"));
    }

    #[test]
    fn generic_types_use_full_names() {
        let serializer = Serializer::new(TypeRegistry::new());
        let mut writer = TokenWriter::new();
        serializer.serialize(&mut writer, &Wrapper { inner: 5_u16 }).unwrap();
        let Token::StructStart { type_name, .. } = &writer.tokens()[1] else {
            panic!("expected a struct header");
        };
        assert_eq!(type_name, core::any::type_name::<Wrapper<u16>>());

        let mut reader = TokenReader::new(writer.into_tokens());
        let back: Wrapper<u16> = serializer.deserialize(&mut reader).unwrap();
        assert_eq!(back.inner, 5);
    }

    #[test]
    fn type_paths_as_names() {
        let mut registry = TypeRegistry::new();
        registry.register::<Job>().unwrap();
        let registry = Arc::new(registry);
        let serializer = Serializer::from_shared(registry.clone())
            .with_names(Arc::new(TypePathResolver::new(registry)));

        let mut writer = TokenWriter::new();
        serializer.serialize(&mut writer, &Ref::new(Job::default())).unwrap();
        assert_eq!(writer.tokens()[1], Token::object("root", core::any::type_name::<Job>(), 0));

        let mut reader = TokenReader::new(writer.into_tokens());
        assert!(serializer.deserialize::<Ref<Job>, _>(&mut reader).is_ok());
    }

    #[test]
    fn concurrent_operations_share_one_serializer() {
        let mut registry = TypeRegistry::new();
        registry.register::<Job>().unwrap();
        let serializer = Serializer::new(registry);

        let labels: Vec<String> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4_u64)
                .map(|index| {
                    let serializer = &serializer;
                    scope.spawn(move || {
                        let job = Ref::new(Job {
                            label: alloc::format!("job-{index}"),
                            timeout: Timeout { millis: index },
                        });
                        let mut writer = TokenWriter::new();
                        serializer.serialize(&mut writer, &job).unwrap();
                        let mut reader = TokenReader::new(writer.into_tokens());
                        let back: Ref<Job> = serializer.deserialize(&mut reader).unwrap();
                        back.borrow().unwrap().label.clone()
                    })
                })
                .collect();
            handles.into_iter().map(|handle| handle.join().unwrap()).collect()
        });
        assert_eq!(labels, ["job-0", "job-1", "job-2", "job-3"]);
    }

    #[test]
    fn first_error_wins() {
        let late = Error::backend("close");
        assert_eq!(finish(Ok(1), Err(late.clone())), Err(late.clone()));
        assert_eq!(
            finish::<()>(Err(Error::malformed("body")), Err(late)),
            Err(Error::malformed("body"))
        );
    }
}
