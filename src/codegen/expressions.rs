use super::context::{CONSTRUCTOR, StructInfo};
use super::{FunctionGenerator, TEMP_PREFIX, mangled_name, reserved_name_error};
use super::builtins;
use super::error::{GenerateError, GenerateErrorKind};
use super::types::ResolvedType;
use crate::ast::{Expression, ExpressionKind, Position};

// Expression lowering
impl<'a> FunctionGenerator<'a> {
    pub(super) fn declare(
        &mut self,
        name: &str,
        ty: ResolvedType,
        pos: Position,
    ) -> Result<(), GenerateError> {
        if name.starts_with(TEMP_PREFIX) {
            return Err(reserved_name_error(name, pos));
        }
        if !self.symbols.declare(name, ty) {
            return Err(GenerateError::new(
                GenerateErrorKind::Redeclaration,
                format!("Variable already declared in this function: {}", name),
                pos,
            ));
        }
        Ok(())
    }

    pub(super) fn lookup(&self, name: &str, pos: Position) -> Result<ResolvedType, GenerateError> {
        self.symbols.lookup(name).cloned().ok_or_else(|| {
            GenerateError::new(
                GenerateErrorKind::UndeclaredVariable,
                format!("Undeclared variable: {}", name),
                pos,
            )
        })
    }

    pub(super) fn lower(&mut self, expr: &Expression) -> Result<String, GenerateError> {
        match &expr.kind {
            ExpressionKind::IntLiteral(value) => Ok(value.to_string()),

            ExpressionKind::StringLiteral(text) => Ok(format!("String__make(\"{}\")", text)),

            ExpressionKind::ArrayLiteral(items) => self.lower_array_literal(items),

            ExpressionKind::Return(inner) => Ok(format!("return {}", self.lower(inner)?)),

            ExpressionKind::Binary { op, lhs, rhs } => {
                let lhs = self.lower(lhs)?;
                let rhs = self.lower(rhs)?;
                Ok(format!("{} {} {}", lhs, op.symbol(), rhs))
            }

            ExpressionKind::Paren(inner) => Ok(format!("({})", self.lower(inner)?)),

            ExpressionKind::VariableDeclaration {
                name,
                type_name,
                init,
            } => {
                let ty = self.context.resolve_type(type_name, expr.pos)?;
                // The initializer cannot see the variable it initializes
                let init = self.lower(init)?;
                let c_type = ty.c_type();
                self.declare(name, ty, expr.pos)?;
                Ok(format!("{} {} = {}", c_type, name, init))
            }

            ExpressionKind::VariableAssignment { name, init } => {
                self.lookup(name, expr.pos)?;
                Ok(format!("{} = {}", name, self.lower(init)?))
            }

            ExpressionKind::VariableRef(name) => {
                self.lookup(name, expr.pos)?;
                Ok(name.clone())
            }

            ExpressionKind::Call { callee, params } => self.lower_call(callee, params, expr.pos),

            ExpressionKind::Accessor { target, inner } => {
                let target_type = self.accessor_target_type(target, expr.pos)?;
                self.lower_member(target.clone(), &target_type, inner)
            }
        }
    }

    fn accessor_target_type(&self, target: &str, pos: Position) -> Result<ResolvedType, GenerateError> {
        self.symbols.lookup(target).cloned().ok_or_else(|| {
            GenerateError::new(
                GenerateErrorKind::UndeclaredVariable,
                format!("Calling undeclared variable: {}", target),
                pos,
            )
        })
    }

    /// Struct behind a `.`; values of other types have no members
    fn member_struct(&self, base_type: &ResolvedType, pos: Position) -> Result<&'a StructInfo, GenerateError> {
        let context = self.context;
        base_type
            .struct_name()
            .and_then(|name| context.struct_info(name))
            .ok_or_else(|| {
                GenerateError::new(
                    GenerateErrorKind::UnknownType,
                    format!("Values of type {} have no fields or methods", base_type),
                    pos,
                )
            })
    }

    fn lower_call(
        &mut self,
        callee: &str,
        params: &[Expression],
        pos: Position,
    ) -> Result<String, GenerateError> {
        if builtins::is_builtin(callee) {
            return self.lower_builtin(callee, params, pos);
        }

        if self.context.is_struct(callee) {
            if !params.is_empty() {
                return Err(GenerateError::new(
                    GenerateErrorKind::Unsupported,
                    format!(
                        "Struct {} is constructed without arguments; assign its fields afterwards",
                        callee
                    ),
                    pos,
                ));
            }
            return Ok(format!("{}()", mangled_name(CONSTRUCTOR, Some(callee))));
        }

        let args = self.lower_arguments(params)?;
        Ok(format!("{}({})", callee, args.join(", ")))
    }

    fn lower_arguments(&mut self, params: &[Expression]) -> Result<Vec<String>, GenerateError> {
        params.iter().map(|param| self.lower(param)).collect()
    }

    /// Lower the part after a `.`; `base` is the C expression of the receiver
    fn lower_member(
        &mut self,
        base: String,
        base_type: &ResolvedType,
        inner: &Expression,
    ) -> Result<String, GenerateError> {
        let info = self.member_struct(base_type, inner.pos)?;

        match &inner.kind {
            ExpressionKind::Call { callee, params } => {
                if info.method_return_type(callee).is_none() {
                    return Err(unknown_method(&info.name, callee, inner.pos));
                }
                // The receiver becomes the leading `self` argument
                let mut args = vec![base];
                args.extend(self.lower_arguments(params)?);
                Ok(format!("{}__{}({})", info.name, callee, args.join(", ")))
            }

            ExpressionKind::VariableRef(field) => {
                if info.field_type(field).is_none() {
                    return Err(unknown_field(&info.name, field, inner.pos));
                }
                Ok(format!("{}->{}", base, field))
            }

            ExpressionKind::VariableAssignment { name: field, init } => {
                if info.field_type(field).is_none() {
                    return Err(unknown_field(&info.name, field, inner.pos));
                }
                Ok(format!("{}->{} = {}", base, field, self.lower(init)?))
            }

            ExpressionKind::Accessor { target: field, inner: rest } => {
                let Some(field_type) = info.field_type(field) else {
                    return Err(unknown_field(&info.name, field, inner.pos));
                };
                self.lower_member(format!("{}->{}", base, field), field_type, rest)
            }

            _ => Err(GenerateError::new(
                GenerateErrorKind::Unsupported,
                "Expected a field or method after '.'".to_string(),
                inner.pos,
            )),
        }
    }

    /// Array literals are built in a temporary emitted ahead of the statement
    fn lower_array_literal(&mut self, items: &[Expression]) -> Result<String, GenerateError> {
        let temp = self.fresh_temp();

        let mut pushes = Vec::with_capacity(items.len());
        for item in items {
            if self.static_type(item)? != Some(ResolvedType::Int) {
                return Err(GenerateError::new(
                    GenerateErrorKind::Unsupported,
                    "Array literal elements must be Int".to_string(),
                    item.pos,
                ));
            }
            let value = self.lower(item)?;
            pushes.push(format!("int_array_push({}, {})", temp, value));
        }

        self.hoisted.push(format!("IntArray* {} = int_array_make()", temp));
        self.hoisted.extend(pushes);
        Ok(temp)
    }

    /// Static type of an expression, when it can be told without lowering it.
    ///
    /// `Ok(None)` means the shape gives no type (statements, calls to unknown
    /// functions). Undeclared names are still errors.
    pub(super) fn static_type(&self, expr: &Expression) -> Result<Option<ResolvedType>, GenerateError> {
        let ty = match &expr.kind {
            ExpressionKind::IntLiteral(_) | ExpressionKind::Binary { .. } => Some(ResolvedType::Int),
            ExpressionKind::StringLiteral(_) => Some(ResolvedType::String),
            ExpressionKind::ArrayLiteral(_) => Some(ResolvedType::IntArray),
            ExpressionKind::Paren(inner) => return self.static_type(inner),
            ExpressionKind::VariableRef(name) => Some(self.lookup(name, expr.pos)?),
            ExpressionKind::Call { callee, .. } => {
                if builtins::is_builtin(callee) {
                    Some(ResolvedType::Void)
                } else if self.context.is_struct(callee) {
                    Some(ResolvedType::Struct(callee.clone()))
                } else {
                    self.context.function_return_type(callee).cloned()
                }
            }
            ExpressionKind::Accessor { target, inner } => {
                let target_type = self.accessor_target_type(target, expr.pos)?;
                self.member_type(&target_type, inner)?
            }
            ExpressionKind::Return(_)
            | ExpressionKind::VariableDeclaration { .. }
            | ExpressionKind::VariableAssignment { .. } => None,
        };
        Ok(ty)
    }

    /// Type of `base.inner`, with the same errors `lower_member` reports
    fn member_type(
        &self,
        base_type: &ResolvedType,
        inner: &Expression,
    ) -> Result<Option<ResolvedType>, GenerateError> {
        let info = self.member_struct(base_type, inner.pos)?;
        let ty = match &inner.kind {
            ExpressionKind::Call { callee, .. } => info
                .method_return_type(callee)
                .ok_or_else(|| unknown_method(&info.name, callee, inner.pos))?,
            ExpressionKind::VariableRef(field) => info
                .field_type(field)
                .ok_or_else(|| unknown_field(&info.name, field, inner.pos))?,
            ExpressionKind::Accessor { target: field, inner: rest } => {
                let field_type = info
                    .field_type(field)
                    .ok_or_else(|| unknown_field(&info.name, field, inner.pos))?;
                return self.member_type(field_type, rest);
            }
            // Field assignment has no value to print
            ExpressionKind::VariableAssignment { name: field, .. } => {
                info.field_type(field)
                    .ok_or_else(|| unknown_field(&info.name, field, inner.pos))?;
                return Ok(None);
            }
            _ => return Ok(None),
        };
        Ok(Some(ty.clone()))
    }
}

fn unknown_field(struct_name: &str, field: &str, pos: Position) -> GenerateError {
    GenerateError::new(
        GenerateErrorKind::UnknownField,
        format!("Struct {} has no field {}", struct_name, field),
        pos,
    )
}

fn unknown_method(struct_name: &str, method: &str, pos: Position) -> GenerateError {
    GenerateError::new(
        GenerateErrorKind::UnknownMethod,
        format!("Struct {} has no method {}", struct_name, method),
        pos,
    )
}
