use crate::{
    Args, ConversionPlan, Error, Mapped, MappingError, ObjectHook, Operation, Parameter,
    ParameterSink, Result, RowLabeled, Rules, ShapeFingerprint, Slot, TypeDef, Value,
    plan_object_to_parameters, plan_row_to_object,
};
use std::{fmt, mem, sync::Arc};

enum RowBody<T> {
    Scalar(fn(Value) -> Result<T>),
    Entity {
        constructor: &'static str,
        build: fn(&mut Args) -> Result<T>,
        /// By member index, `None` for read-only members.
        setters: Box<[Option<fn(&mut T, Value) -> Result<()>>]>,
    },
}

/// Compiled routine building a `T` out of every row of one shape.
///
/// Produced by [`crate::Mapper::compile_row_to_object`], shared between
/// threads and reused for every row with the same fingerprint.
pub struct RowToObject<T> {
    plan: ConversionPlan,
    body: RowBody<T>,
    hook: Option<Arc<dyn ObjectHook<T>>>,
}

impl<T> fmt::Debug for RowToObject<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowToObject")
            .field("plan", &self.plan)
            .field("hook", &self.hook.is_some())
            .finish()
    }
}

fn conversion_error(fingerprint: &ShapeFingerprint, field: &str, error: Error) -> Error {
    MappingError::ConversionError {
        target: fingerprint.target_name,
        field: field.to_owned(),
        reason: format!("{error:#}"),
    }
    .into()
}

impl<T: Mapped> RowToObject<T> {
    pub(crate) fn compile(fingerprint: &ShapeFingerprint, rules: &Rules) -> Result<Self> {
        let def = T::type_def();
        let plan = plan_row_to_object(&def, fingerprint, rules)?;
        let body = match def {
            TypeDef::Scalar(scalar) => RowBody::Scalar(scalar.from_value),
            TypeDef::Entity(mut entity) => {
                let Some(constructor) = plan.constructor.map(|c| entity.constructors.swap_remove(c))
                else {
                    return Err(Error::msg(format!(
                        "No constructor was selected for {fingerprint}"
                    )));
                };
                RowBody::Entity {
                    constructor: constructor.name,
                    build: constructor.build,
                    setters: entity.members.iter().map(|m| m.set).collect(),
                }
            }
        };
        Ok(Self {
            plan,
            body,
            hook: rules.object_hook::<T>(),
        })
    }
}

impl<T> RowToObject<T> {
    pub fn plan(&self) -> &ConversionPlan {
        &self.plan
    }
    pub fn fingerprint(&self) -> &ShapeFingerprint {
        &self.plan.fingerprint
    }

    fn run(&self, op: &Operation, values: &mut [Value]) -> Result<Value> {
        let value = values.get_mut(op.source).map(mem::take).unwrap_or_default();
        if value.is_null()
            && let Some(replacement) = &op.on_null
        {
            return Ok(replacement.clone());
        }
        let value = op.coercion.apply(value)?;
        match &op.handler {
            Some(handler) => handler.get(value),
            None => Ok(value),
        }
    }

    /// Builds the object out of `row`, whose fields must have the compiled shape.
    pub fn call(&self, row: RowLabeled) -> Result<T> {
        let fingerprint = &self.plan.fingerprint;
        if row.values.len() != fingerprint.fields.len() {
            return Err(MappingError::ShapeMismatch {
                target: fingerprint.target_name,
                shape: fingerprint.shape(),
                reason: format!(
                    "the row has {} values, the routine was compiled for {}",
                    row.values.len(),
                    fingerprint.fields.len()
                ),
            }
            .into());
        }
        let mut values = row.values;
        let result = match &self.body {
            RowBody::Scalar(from_value) => {
                let Some(op) = self.plan.operations.first() else {
                    return Err(Error::msg(format!("Empty plan for {fingerprint}")));
                };
                self.run(op, &mut values)
                    .and_then(from_value)
                    .map_err(|e| conversion_error(fingerprint, &op.name, e))?
            }
            RowBody::Entity {
                constructor,
                build,
                setters,
            } => {
                let mut args = Args::with_capacity(self.plan.arity());
                for op in self.plan.arguments() {
                    let value = self
                        .run(op, &mut values)
                        .map_err(|e| conversion_error(fingerprint, &op.name, e))?;
                    args.push(value);
                }
                let mut entity = build(&mut args).map_err(|e| {
                    conversion_error(fingerprint, &format!("{constructor}(..)"), e)
                })?;
                for op in self.plan.assignments() {
                    let Slot::Member(member) = op.destination else {
                        continue;
                    };
                    let Some(Some(set)) = setters.get(member) else {
                        continue;
                    };
                    self.run(op, &mut values)
                        .and_then(|value| set(&mut entity, value))
                        .map_err(|e| conversion_error(fingerprint, &op.name, e))?;
                }
                entity
            }
        };
        match &self.hook {
            Some(hook) => hook.after_read(result),
            None => Ok(result),
        }
    }
}

/// Compiled routine reading the members of a `P` into command parameters.
///
/// Produced by [`crate::Mapper::compile_object_to_parameters`].
pub struct ObjectToParameters<P> {
    plan: ConversionPlan,
    /// By member index.
    getters: Box<[fn(&P) -> Value]>,
}

impl<P> fmt::Debug for ObjectToParameters<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectToParameters")
            .field("plan", &self.plan)
            .finish()
    }
}

impl<P: Mapped> ObjectToParameters<P> {
    pub(crate) fn compile<E: Mapped>(fingerprint: &ShapeFingerprint, rules: &Rules) -> Result<Self> {
        let def = P::type_def();
        let plan = plan_object_to_parameters(&def, &E::type_def(), fingerprint, rules)?;
        let getters = match def {
            TypeDef::Entity(entity) => entity.members.iter().map(|m| m.get).collect(),
            TypeDef::Scalar(..) => Box::default(),
        };
        Ok(Self { plan, getters })
    }
}

impl<P> ObjectToParameters<P> {
    pub fn plan(&self) -> &ConversionPlan {
        &self.plan
    }
    pub fn fingerprint(&self) -> &ShapeFingerprint {
        &self.plan.fingerprint
    }

    /// Appends one parameter per member of `entity` to `sink`, nothing is
    /// appended when any member fails to convert.
    pub fn call(&self, sink: &mut dyn ParameterSink, entity: &P) -> Result<()> {
        let fingerprint = &self.plan.fingerprint;
        let mut parameters = Vec::with_capacity(self.plan.operations.len());
        for op in &self.plan.operations {
            let Some(get) = self.getters.get(op.source) else {
                continue;
            };
            let value = get(entity);
            let value = match &op.handler {
                Some(handler) => handler.set(value),
                None => Ok(value),
            }
            .and_then(|value| op.coercion.apply(value))
            .map_err(|e| conversion_error(fingerprint, &op.name, e))?;
            let storage_type = match op.destination {
                Slot::Parameter(storage_type) => storage_type,
                _ => None,
            };
            parameters.push(Parameter {
                name: op.name.clone(),
                value,
                storage_type,
            });
        }
        for parameter in parameters {
            sink.push_parameter(parameter);
        }
        Ok(())
    }
}
